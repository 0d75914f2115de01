// SPDX-License-Identifier: GPL-3.0-only
//! Icon selection for block devices
//!
//! Rules are checked from the most specific drive kind down to the bus type,
//! so a USB optical drive is shown as optical and not as a USB disk.

use crate::hotplug::DeviceEvent;

/// Freedesktop icon shown with a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    DeviceMapper,
    Harddisk,
    HarddiskIeee1394,
    HarddiskUsb,
    Optical,
    OpticalAudio,
    MultiDisk,
    Loop,
    Flash,
    Floppy,
    Removable,
    Zip,
    MultimediaPlayer,
    NetworkServer,
    Unknown,
}

impl Icon {
    /// Icon theme name
    pub fn name(self) -> &'static str {
        match self {
            Icon::DeviceMapper => "media-playlist-shuffle",
            Icon::Harddisk => "drive-harddisk",
            Icon::HarddiskIeee1394 => "drive-harddisk-ieee1394",
            Icon::HarddiskUsb => "drive-harddisk-usb",
            Icon::Optical => "drive-optical",
            Icon::OpticalAudio => "media-optical-audio",
            Icon::MultiDisk => "drive-multidisk",
            Icon::Loop => "media-playlist-repeat",
            Icon::Flash => "media-flash",
            Icon::Floppy => "media-floppy",
            Icon::Removable => "media-removable",
            Icon::Zip => "media-zip",
            Icon::MultimediaPlayer => "multimedia-player",
            Icon::NetworkServer => "network-server",
            Icon::Unknown => "dialog-question",
        }
    }
}

const FLASH_READERS: [&str; 4] = [
    "ID_DRIVE_FLASH_CF",
    "ID_DRIVE_FLASH_MS",
    "ID_DRIVE_FLASH_SD",
    "ID_DRIVE_FLASH_SM",
];

/// Pick exactly one icon for the event's device
pub fn classify(event: &DeviceEvent) -> Icon {
    if event.has_attribute("ID_CDROM") {
        if event.has_attribute("ID_CDROM_MEDIA_TRACK_COUNT_AUDIO") {
            Icon::OpticalAudio
        } else {
            Icon::Optical
        }
    } else if event.has_attribute("ID_DRIVE_FLOPPY") {
        Icon::Floppy
    } else if event.has_attribute("ID_DRIVE_THUMB") {
        Icon::Removable
    } else if FLASH_READERS.iter().any(|key| event.has_attribute(key)) {
        Icon::Flash
    } else if event.has_attribute("ID_DRIVE_FLOPPY_ZIP") {
        Icon::Zip
    } else if event.has_attribute("ID_MEDIA_PLAYER") {
        Icon::MultimediaPlayer
    } else if event.has_attribute("DM_NAME") {
        Icon::DeviceMapper
    } else if event.has_attribute("MD_NAME") {
        Icon::MultiDisk
    } else if event.name.starts_with("loop") || event.name.starts_with("ram") {
        Icon::Loop
    } else if event.name.starts_with("nbd") {
        Icon::NetworkServer
    } else {
        match event.attribute("ID_BUS") {
            Some("ata" | "scsi") => Icon::Harddisk,
            Some("usb") => Icon::HarddiskUsb,
            Some("ieee1394") => Icon::HarddiskIeee1394,
            _ => Icon::Unknown,
        }
    }
}
