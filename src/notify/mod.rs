// SPDX-License-Identifier: GPL-3.0-only
//! Desktop notification output
//!
//! `NotificationSink` is the seam between the daemon loop and the
//! notification service. The D-Bus implementation talks to
//! `org.freedesktop.Notifications`; tests use an in-memory sink.

pub mod dbus;
mod registry;

pub use registry::NotificationRegistry;

use thiserror::Error;

use crate::compose::Icon;

/// Category hint attached to every notification
pub const CATEGORY: &str = "udev-block-notify";

/// Transient failure talking to the notification service
#[derive(Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    DBus(#[from] zbus::Error),

    #[error("notification service unavailable: {0}")]
    Unavailable(String),
}

/// Common trait for notification services
pub trait NotificationSink {
    /// Handle to one on-screen notification, reusable across updates
    type Handle;

    /// Create a blank handle with the fixed category and urgency
    fn create(&mut self) -> Self::Handle;

    fn update(&mut self, handle: &mut Self::Handle, title: &str, body: &str, icon: Icon);

    fn set_timeout(&mut self, handle: &mut Self::Handle, timeout_ms: i32);

    /// Show the notification, replacing what was shown with this handle before
    fn show(&mut self, handle: &mut Self::Handle) -> Result<(), SinkError>;

    /// Drop the current connection and open a new one
    fn reconnect(&mut self) -> Result<(), SinkError>;

    /// Whether the service renders `<b>`/`<i>` markup in bodies
    fn supports_markup(&self) -> bool;
}
