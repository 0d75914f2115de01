// SPDX-License-Identifier: GPL-3.0-only
//! D-Bus client for the freedesktop notification service
//!
//! Bus name: `org.freedesktop.Notifications`
//! Object path: `/org/freedesktop/Notifications`
//!
//! A notification is replaced in place by passing the id returned from the
//! previous `Notify` call as `replaces_id`.

use std::collections::HashMap;

use zbus::blocking::Connection;
use zbus::proxy;
use zbus::zvariant::Value;

use super::{CATEGORY, NotificationSink, SinkError};
use crate::compose::Icon;

/// Application name reported to the notification service
pub const APP_NAME: &str = "Udev-Block-Notification";

/// Urgency hint value for "normal"
const URGENCY_NORMAL: u8 = 1;

/// Freedesktop notification service D-Bus proxy
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Show or replace a notification, returns its id
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: &HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    /// Optional features of the server, e.g. "body-markup"
    fn get_capabilities(&self) -> zbus::Result<Vec<String>>;

    /// (name, vendor, version, spec_version)
    fn get_server_information(&self) -> zbus::Result<(String, String, String, String)>;
}

/// One on-screen notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbusNotification {
    /// Server-side id, 0 until first shown
    id: u32,
    summary: String,
    body: String,
    icon: &'static str,
    timeout_ms: i32,
}

impl DbusNotification {
    fn blank() -> Self {
        Self {
            id: 0,
            summary: String::new(),
            body: String::new(),
            icon: Icon::Unknown.name(),
            timeout_ms: -1,
        }
    }
}

pub struct DbusSink {
    proxy: NotificationsProxyBlocking<'static>,
    markup: bool,
}

impl DbusSink {
    /// Connect to the session bus and query the notification server
    pub fn connect() -> Result<Self, SinkError> {
        let proxy = open_proxy()?;

        match proxy.get_server_information() {
            Ok((name, vendor, version, spec_version)) => {
                debug!(
                    "Notification server: {} {} ({}), spec {}",
                    name, version, vendor, spec_version
                );
            }
            Err(e) => warn!("Failed to query notification server information: {}", e),
        }

        let markup = match proxy.get_capabilities() {
            Ok(capabilities) => capabilities.iter().any(|c| c == "body-markup"),
            Err(e) => {
                warn!("Failed to query notification server capabilities: {}", e);
                false
            }
        };
        info!("Connected to notification service (body markup: {})", markup);

        Ok(Self { proxy, markup })
    }
}

fn open_proxy() -> Result<NotificationsProxyBlocking<'static>, SinkError> {
    let connection = Connection::session()?;
    let proxy = NotificationsProxyBlocking::new(&connection)?;
    Ok(proxy)
}

impl NotificationSink for DbusSink {
    type Handle = DbusNotification;

    fn create(&mut self) -> DbusNotification {
        DbusNotification::blank()
    }

    fn update(&mut self, handle: &mut DbusNotification, title: &str, body: &str, icon: Icon) {
        handle.summary = title.to_string();
        handle.body = body.to_string();
        handle.icon = icon.name();
    }

    fn set_timeout(&mut self, handle: &mut DbusNotification, timeout_ms: i32) {
        handle.timeout_ms = timeout_ms;
    }

    fn show(&mut self, handle: &mut DbusNotification) -> Result<(), SinkError> {
        let category = Value::from(CATEGORY);
        let urgency = Value::from(URGENCY_NORMAL);
        let hints = HashMap::from([("category", &category), ("urgency", &urgency)]);

        let id = self.proxy.notify(
            APP_NAME,
            handle.id,
            handle.icon,
            &handle.summary,
            &handle.body,
            &[],
            &hints,
            handle.timeout_ms,
        )?;
        if id == 0 {
            return Err(SinkError::Unavailable(
                "server returned an invalid notification id".to_string(),
            ));
        }

        trace!("Notification {} shown (replaced {})", id, handle.id);
        handle.id = id;
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), SinkError> {
        self.proxy = open_proxy()?;
        info!("Reconnected to notification service");
        Ok(())
    }

    fn supports_markup(&self) -> bool {
        self.markup
    }
}
