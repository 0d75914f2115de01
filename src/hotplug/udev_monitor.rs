// SPDX-License-Identifier: GPL-3.0-only
use std::ffi::OsStr;
use std::io;
use std::os::fd::AsRawFd;

use super::{Action, DeviceEvent, DeviceNumber, EventSource, Wakeup};
use crate::shutdown::Shutdown;

/// Monitors udev for block device events
///
/// udev's MonitorSocket is not Send, so this lives on the main thread and is
/// driven by the daemon loop with libc::poll().
pub struct BlockMonitor {
    socket: udev::MonitorSocket,
}

impl BlockMonitor {
    /// Create a new udev monitor for the block subsystem
    pub fn new() -> Result<Self, std::io::Error> {
        let socket = udev::MonitorBuilder::new()?
            .match_subsystem("block")?
            .listen()?;

        info!("Block device monitoring started");

        Ok(Self { socket })
    }
}

impl EventSource for BlockMonitor {
    fn wait(&mut self, shutdown: &mut Shutdown) -> io::Result<Wakeup> {
        trace!("Waiting for udev events...");

        match wait_readable(self.socket.as_raw_fd(), shutdown.wake_fd(), -1)? {
            Readiness::Shutdown => {
                shutdown.drain()?;
                return Ok(Wakeup::Shutdown);
            }
            Readiness::Nothing => return Ok(Wakeup::Idle),
            Readiness::Source => {}
        }

        match self.socket.iter().next() {
            Some(event) => {
                debug!(
                    "udev event: action={:?}, sysname={:?}, devnum={:?}",
                    event.action(),
                    event.sysname(),
                    event.devnum()
                );
                Ok(Wakeup::Event(device_event(&event)))
            }
            None => {
                debug!("Poll indicated ready but no event available");
                Ok(Wakeup::Idle)
            }
        }
    }
}

/// Which fd of a [`wait_readable`] call has data
#[derive(Debug, PartialEq, Eq)]
enum Readiness {
    Source,
    Shutdown,
    /// Interrupted by a signal, or woken without input
    Nothing,
}

/// Poll the event source next to the wake-up pipe
///
/// A readable wake-up pipe wins over a readable source so shutdown is never
/// delayed by a busy device. A negative timeout waits forever.
fn wait_readable(
    source: impl AsRawFd,
    wake: impl AsRawFd,
    timeout_ms: libc::c_int,
) -> io::Result<Readiness> {
    let mut poll_fds = [
        libc::pollfd {
            fd: source.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: wake.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    let poll_result = unsafe {
        libc::poll(
            poll_fds.as_mut_ptr(),
            poll_fds.len() as libc::nfds_t,
            timeout_ms,
        )
    };

    if poll_result < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(Readiness::Nothing);
        }
        error!("Poll error: {}", err);
        return Err(err);
    }

    if poll_fds[1].revents != 0 {
        return Ok(Readiness::Shutdown);
    }

    if poll_fds[0].revents & libc::POLLIN == 0 {
        debug!("Poll returned {}, revents: {}", poll_result, poll_fds[0].revents);
        return Ok(Readiness::Nothing);
    }

    Ok(Readiness::Source)
}

fn device_event(device: &udev::Device) -> DeviceEvent {
    collect_event(
        parse_action(device.action()),
        device.sysname().to_string_lossy(),
        device_number(device.devnum()),
        device.properties().map(|property| {
            (
                property.name().to_string_lossy().into_owned(),
                property.value().to_string_lossy().into_owned(),
            )
        }),
    )
}

/// Missing and non-UTF-8 actions are unknown
fn parse_action(action: Option<&OsStr>) -> Action {
    action
        .and_then(|action| action.to_str())
        .map(Action::parse)
        .unwrap_or(Action::Unknown)
}

/// Devices without a node get 0:0
fn device_number(devnum: Option<libc::dev_t>) -> DeviceNumber {
    devnum
        .map(DeviceNumber::from_dev_t)
        .unwrap_or(DeviceNumber::new(0, 0))
}

fn collect_event(
    action: Action,
    name: impl Into<String>,
    devnum: DeviceNumber,
    properties: impl IntoIterator<Item = (String, String)>,
) -> DeviceEvent {
    properties
        .into_iter()
        .fold(DeviceEvent::new(action, name, devnum), |event, (key, value)| {
            event.with_attribute(key, value)
        })
}
