// SPDX-License-Identifier: GPL-3.0-only
//! Per-device notification handles
//!
//! Every device number owns one notification for the lifetime of the process,
//! so a burst of events for the same node updates a single popup. Entries are
//! never evicted: a removed node number may come back with the next device.

use std::collections::HashMap;

use super::NotificationSink;
use crate::hotplug::DeviceNumber;

pub struct NotificationRegistry<H> {
    handles: HashMap<DeviceNumber, H>,
}

impl<H> NotificationRegistry<H> {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Get the handle for `devnum`, creating a blank one on first use
    pub fn resolve<S>(&mut self, devnum: DeviceNumber, sink: &mut S) -> &mut H
    where
        S: NotificationSink<Handle = H>,
    {
        self.handles.entry(devnum).or_insert_with(|| {
            debug!("Creating notification for device {}", devnum);
            sink.create()
        })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
