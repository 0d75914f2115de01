// SPDX-License-Identifier: GPL-3.0-only
//! Block device events as seen by the notification pipeline

use std::collections::HashMap;
use std::fmt;

/// What happened to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Move,
    Change,
    Unknown,
}

impl Action {
    /// Parse a udev action string ("add", "remove", ...)
    ///
    /// Anything unrecognized, including bind/unbind, maps to `Unknown`.
    pub fn parse(action: &str) -> Self {
        match action {
            "add" => Action::Add,
            "remove" => Action::Remove,
            "move" => Action::Move,
            "change" => Action::Change,
            _ => Action::Unknown,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Add => "add",
            Action::Remove => "remove",
            Action::Move => "move",
            Action::Change => "change",
            Action::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Kernel device node number, split into major and minor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Decode a `dev_t` using the platform's major/minor encoding
    pub fn from_dev_t(devnum: libc::dev_t) -> Self {
        Self::new(libc::major(devnum), libc::minor(devnum))
    }
}

impl fmt::Display for DeviceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// One device change delivered by the event source
#[derive(Debug, Clone)]
pub struct DeviceEvent {
    pub action: Action,
    /// Short kernel name, e.g. "sda1" or "dm-0"
    pub name: String,
    pub devnum: DeviceNumber,
    pub attributes: HashMap<String, String>,
}

impl DeviceEvent {
    pub fn new(action: Action, name: impl Into<String>, devnum: DeviceNumber) -> Self {
        Self {
            action,
            name: name.into(),
            devnum,
            attributes: HashMap::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute, treating empty values the same as missing ones
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }
}
