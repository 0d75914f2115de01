// SPDX-License-Identifier: GPL-3.0-only
//! Event filtering
//!
//! Device-mapper creates several internal nodes for each visible volume
//! (unnamed dm-N nodes while a table loads, snapshot cow and origin "real"
//! layers). Those are dropped here so only user-visible volumes are shown.

use crate::hotplug::DeviceEvent;

/// Returns the event if it should be displayed, `None` if it is filtered
pub fn route(event: DeviceEvent) -> Option<DeviceEvent> {
    if event.name.starts_with("dm") {
        if !event.has_attribute("DM_NAME") {
            debug!("Skipping {} ({}): device mapper node without name", event.name, event.devnum);
            return None;
        }

        if let Some(layer @ ("cow" | "real")) = event.attribute("DM_LV_LAYER") {
            debug!("Skipping {} ({}): internal {} layer", event.name, event.devnum, layer);
            return None;
        }
    }

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotplug::{Action, DeviceNumber};

    fn dm_event() -> DeviceEvent {
        DeviceEvent::new(Action::Add, "dm-3", DeviceNumber::new(253, 3))
    }

    #[test]
    fn test_unnamed_dm_dropped() {
        assert!(route(dm_event()).is_none());
    }

    #[test]
    fn test_empty_dm_name_dropped() {
        assert!(route(dm_event().with_attribute("DM_NAME", "")).is_none());
    }

    #[test]
    fn test_named_dm_passes() {
        let event = route(dm_event().with_attribute("DM_NAME", "vg0-lv0")).unwrap();
        assert_eq!(event.name, "dm-3");
        assert_eq!(event.devnum, DeviceNumber::new(253, 3));
    }

    #[test]
    fn test_snapshot_layers_dropped() {
        for layer in ["cow", "real"] {
            let event = dm_event()
                .with_attribute("DM_NAME", "vg0-lv0")
                .with_attribute("DM_LV_LAYER", layer);
            assert!(route(event).is_none(), "layer {} should be dropped", layer);
        }
    }

    #[test]
    fn test_other_layers_pass() {
        let event = dm_event()
            .with_attribute("DM_NAME", "vg0-pool")
            .with_attribute("DM_LV_LAYER", "tpool");
        assert!(route(event).is_some());
    }

    #[test]
    fn test_non_dm_devices_pass() {
        let event = DeviceEvent::new(Action::Remove, "sda1", DeviceNumber::new(8, 1))
            .with_attribute("DM_LV_LAYER", "cow");
        assert!(route(event).is_some());
    }
}
