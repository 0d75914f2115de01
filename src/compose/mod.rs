// SPDX-License-Identifier: GPL-3.0-only
//! Notification text and icon composition
//!
//! Turns a device event into the title, body and icon of a notification.
//! The body starts with a sentence describing the action and, except for
//! removals, continues with one line per known filesystem, partition or
//! volume attribute.

mod icon;

pub use icon::{Icon, classify};

use std::borrow::Cow;

use crate::hotplug::{Action, DeviceEvent};

/// Summary line shared by all notifications
pub const TITLE: &str = "Udev Block Notification";

/// Attributes rendered in the body, in display order
const TAGS: [(&str, &str); 9] = [
    ("ID_FS_LABEL", "Label"),
    ("ID_FS_TYPE", "Type"),
    ("ID_FS_USAGE", "Usage"),
    ("ID_FS_UUID", "UUID"),
    ("ID_PART_TABLE_TYPE", "Partition Table Type"),
    ("ID_PART_TABLE_NAME", "Partition Table Name"),
    ("ID_PART_ENTRY_TYPE", "Partition Type"),
    ("DM_NAME", "Device mapper name"),
    ("MD_LEVEL", "Multi disk level"),
];

/// How emphasis is written into the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// `<b>`/`<i>` tags, for servers with the body-markup capability
    Markup,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedNotification {
    pub title: &'static str,
    pub body: String,
    pub icon: Icon,
    pub timeout_ms: i32,
}

#[derive(Debug, Clone)]
pub struct Composer {
    style: MessageStyle,
    timeout_ms: i32,
}

impl Composer {
    pub fn new(style: MessageStyle, timeout_ms: i32) -> Self {
        Self { style, timeout_ms }
    }

    pub fn style(&self) -> MessageStyle {
        self.style
    }

    pub fn compose(&self, event: &DeviceEvent) -> ComposedNotification {
        ComposedNotification {
            title: TITLE,
            body: self.body(event),
            icon: classify(event),
            timeout_ms: self.timeout_ms,
        }
    }

    fn body(&self, event: &DeviceEvent) -> String {
        let device = self.bold(&event.name);
        let devnum = event.devnum;

        let mut body = match event.action {
            Action::Add => format!("Device {} ({}) {}.", device, devnum, self.bold("appeared")),
            Action::Remove => {
                format!("Device {} ({}) {}.", device, devnum, self.bold("disappeared"))
            }
            Action::Move => format!("Device {} ({}) was {}.", device, devnum, self.bold("renamed")),
            Action::Change => {
                format!("Device {} ({}) media {}.", device, devnum, self.bold("changed"))
            }
            Action::Unknown => format!("Anything happened to {} ({})... Don't know.", device, devnum),
        };

        // Content attributes of a vanished device are stale
        if event.action != Action::Remove {
            for (key, label) in TAGS {
                if let Some(value) = event.attribute(key) {
                    body.push_str(&format!("\n{}: {}", label, self.italic(value)));
                }
            }
        }

        body
    }

    fn bold<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.emphasize(text, "b")
    }

    fn italic<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.emphasize(text, "i")
    }

    fn emphasize<'a>(&self, text: &'a str, tag: &str) -> Cow<'a, str> {
        match self.style {
            MessageStyle::Plain => Cow::Borrowed(text),
            MessageStyle::Markup => Cow::Owned(format!("<{tag}>{}</{tag}>", escape_markup(text))),
        }
    }
}

/// Escape text so it can be embedded in notification markup
fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
