// SPDX-License-Identifier: GPL-3.0-only
//! Service manager notifications (sd_notify protocol)
//!
//! Sends `READY=1` / `STOPPING=1` datagrams to `$NOTIFY_SOCKET` when running
//! under systemd with `Type=notify`. Outside systemd this is a no-op.

use std::ffi::OsStr;
use std::io;
use std::os::linux::net::SocketAddrExt;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::{SocketAddr, UnixDatagram};

pub const READY: &str = "READY=1";
pub const STOPPING: &str = "STOPPING=1";

/// Notify the service manager, logging instead of failing
pub fn notify(state: &str) {
    match notify_socket(std::env::var_os("NOTIFY_SOCKET").as_deref(), state) {
        Ok(true) => debug!("Sent {} to service manager", state),
        Ok(false) => trace!("No service manager socket, not sending {}", state),
        Err(e) => warn!("Failed to send {} to service manager: {}", state, e),
    }
}

/// Returns false when there is no socket to notify
fn notify_socket(socket: Option<&OsStr>, state: &str) -> io::Result<bool> {
    let Some(path) = socket.filter(|path| !path.is_empty()) else {
        return Ok(false);
    };

    let datagram = UnixDatagram::unbound()?;
    match path.as_bytes().strip_prefix(b"@") {
        // Abstract namespace socket
        Some(name) => {
            let addr = SocketAddr::from_abstract_name(name)?;
            datagram.send_to_addr(state.as_bytes(), &addr)?;
        }
        None => {
            datagram.send_to(state.as_bytes(), path)?;
        }
    }
    Ok(true)
}
