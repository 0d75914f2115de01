// SPDX-License-Identifier: GPL-3.0-only
//! Block device hotplug detection using udev
//!
//! The udev monitor is the event source of the notification pipeline. It is
//! polled together with the shutdown pipe so a signal can end a blocking wait.

mod event;
mod udev_monitor;

pub use event::{Action, DeviceEvent, DeviceNumber};
pub use udev_monitor::BlockMonitor;

use crate::shutdown::Shutdown;

/// Outcome of one blocking wait on an event source
#[derive(Debug)]
pub enum Wakeup {
    Event(DeviceEvent),
    Shutdown,
    /// Woken without a usable event (EINTR, empty socket read)
    Idle,
}

/// Anything that delivers device events to the daemon loop
pub trait EventSource {
    /// Block until an event arrives or shutdown is requested
    fn wait(&mut self, shutdown: &mut Shutdown) -> std::io::Result<Wakeup>;
}
