// SPDX-License-Identifier: GPL-3.0-only
//! Cooperative shutdown
//!
//! A signal sets the stop flag and writes one byte into a pipe. The event loop
//! polls the read end next to the udev socket, so a blocked wait wakes up
//! without interrupting a notification that is already being shown.

use std::io::{self, PipeReader, PipeWriter, Read, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Shutdown {
    requested: Arc<AtomicBool>,
    reader: PipeReader,
    writer: PipeWriter,
}

/// Handle that requests shutdown from another thread
pub struct ShutdownTrigger {
    requested: Arc<AtomicBool>,
    writer: PipeWriter,
}

impl Shutdown {
    pub fn new() -> io::Result<Self> {
        let (reader, writer) = io::pipe()?;
        Ok(Self {
            requested: Arc::new(AtomicBool::new(false)),
            reader,
            writer,
        })
    }

    pub fn trigger(&self) -> io::Result<ShutdownTrigger> {
        Ok(ShutdownTrigger {
            requested: Arc::clone(&self.requested),
            writer: self.writer.try_clone()?,
        })
    }

    /// Route SIGINT, SIGTERM and SIGHUP to this shutdown handle
    pub fn install_signal_handler(&self) -> Result<(), ctrlc::Error> {
        let mut trigger = self.trigger().map_err(ctrlc::Error::System)?;
        ctrlc::set_handler(move || {
            info!("Termination signal received, shutting down");
            trigger.fire();
        })
    }

    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Read end of the wake-up pipe, readable once shutdown was requested
    pub fn wake_fd(&self) -> BorrowedFd<'_> {
        self.reader.as_fd()
    }

    /// Consume pending wake-up bytes
    ///
    /// Only call this after poll reported the pipe readable.
    pub fn drain(&mut self) -> io::Result<()> {
        let mut buf = [0u8; 64];
        let _ = self.reader.read(&mut buf)?;
        Ok(())
    }
}

impl ShutdownTrigger {
    pub fn fire(&mut self) {
        self.requested.store(true, Ordering::SeqCst);
        if let Err(e) = self.writer.write_all(&[1]) {
            // The flag alone still stops the loop at its next iteration
            warn!("Failed to wake event loop: {}", e);
        }
    }
}
