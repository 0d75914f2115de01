// SPDX-License-Identifier: GPL-3.0-only
//! Block device notification daemon
//!
//! Single-threaded loop: wait for a udev event, filter it, compose the
//! notification, look up the device's notification handle and show it.
//! Each event is fully displayed before the stop flag is checked again.

use std::thread;

use crate::compose::{Composer, MessageStyle};
use crate::config::{Config, RetryPolicy};
use crate::error::{AppError, Result};
use crate::hotplug::{DeviceEvent, EventSource, Wakeup};
use crate::notify::{NotificationRegistry, NotificationSink};
use crate::router;
use crate::shutdown::Shutdown;

/// Process-wide state threaded through the event loop
pub struct Context {
    pub config: Config,
    pub shutdown: Shutdown,
}

pub struct Daemon<S: NotificationSink> {
    sink: S,
    composer: Composer,
    registry: NotificationRegistry<S::Handle>,
    retry: RetryPolicy,
}

impl<S: NotificationSink> Daemon<S> {
    pub fn new(sink: S, config: &Config) -> Self {
        let style = if sink.supports_markup() {
            MessageStyle::Markup
        } else {
            MessageStyle::Plain
        };

        Self {
            sink,
            composer: Composer::new(style, config.timeout_ms),
            registry: NotificationRegistry::new(),
            retry: config.retry.clone(),
        }
    }

    /// Run until shutdown is requested or the notification service is gone
    pub fn run<E: EventSource>(&mut self, ctx: &mut Context, source: &mut E) -> Result<()> {
        info!(
            "Watching block devices (timeout {} ms, {:?} messages)",
            ctx.config.timeout_ms,
            self.composer.style()
        );

        while !ctx.shutdown.requested() {
            match source.wait(&mut ctx.shutdown)? {
                Wakeup::Event(event) => {
                    self.handle_event(event)?;
                }
                Wakeup::Shutdown => break,
                Wakeup::Idle => {}
            }

            if !ctx.config.throttle.is_zero() {
                thread::sleep(ctx.config.throttle);
            }
        }

        info!(
            "Event loop stopped, {} device notification(s) created",
            self.registry.len()
        );
        Ok(())
    }

    /// Process one event, returns whether a notification was shown
    pub fn handle_event(&mut self, event: DeviceEvent) -> Result<bool> {
        let Some(event) = router::route(event) else {
            return Ok(false);
        };

        let notification = self.composer.compose(&event);
        debug!(
            devnum = %event.devnum,
            action = %event.action,
            icon = notification.icon.name(),
            "{}: {}",
            event.name,
            notification.body
        );

        let handle = self.registry.resolve(event.devnum, &mut self.sink);
        self.sink
            .update(handle, notification.title, &notification.body, notification.icon);
        self.sink.set_timeout(handle, notification.timeout_ms);

        show_with_retry(&mut self.sink, handle, &self.retry)?;
        Ok(true)
    }

    #[cfg(test)]
    fn sink(&self) -> &S {
        &self.sink
    }
}

/// Show a notification, reconnecting a bounded number of times on failure
fn show_with_retry<S: NotificationSink>(
    sink: &mut S,
    handle: &mut S::Handle,
    policy: &RetryPolicy,
) -> Result<()> {
    let mut attempts = 0;

    loop {
        let err = match sink.show(handle) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if attempts >= policy.max_reconnects {
            return Err(AppError::SinkDisplay {
                attempts,
                source: err,
            });
        }
        attempts += 1;

        info!(
            "Error \"{}\" while trying to show notification, reconnecting ({}/{})",
            err, attempts, policy.max_reconnects
        );
        thread::sleep(policy.delay);

        // A failed reconnect leaves the old connection; the next show fails
        // and uses up another attempt
        if let Err(e) = sink.reconnect() {
            info!("Reconnect to notification service failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use super::*;
    use crate::compose::Icon;
    use crate::hotplug::{Action, DeviceNumber};
    use crate::notify::SinkError;

    #[derive(Debug, Clone, PartialEq)]
    struct Shown {
        handle: u32,
        title: String,
        body: String,
        icon: Icon,
        timeout_ms: i32,
    }

    #[derive(Debug, Default, Clone)]
    struct MemoryHandle {
        serial: u32,
        title: String,
        body: String,
        icon: Option<Icon>,
        timeout_ms: i32,
    }

    /// In-memory notification service
    #[derive(Default)]
    struct MemorySink {
        created: u32,
        shown: Vec<Shown>,
        /// Number of upcoming show calls that fail
        failures: u32,
        reconnects: u32,
        reconnect_fails: bool,
        markup: bool,
    }

    impl NotificationSink for MemorySink {
        type Handle = MemoryHandle;

        fn create(&mut self) -> MemoryHandle {
            self.created += 1;
            MemoryHandle {
                serial: self.created,
                ..MemoryHandle::default()
            }
        }

        fn update(&mut self, handle: &mut MemoryHandle, title: &str, body: &str, icon: Icon) {
            handle.title = title.to_string();
            handle.body = body.to_string();
            handle.icon = Some(icon);
        }

        fn set_timeout(&mut self, handle: &mut MemoryHandle, timeout_ms: i32) {
            handle.timeout_ms = timeout_ms;
        }

        fn show(&mut self, handle: &mut MemoryHandle) -> std::result::Result<(), SinkError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(SinkError::Unavailable("daemon went away".to_string()));
            }
            self.shown.push(Shown {
                handle: handle.serial,
                title: handle.title.clone(),
                body: handle.body.clone(),
                icon: handle.icon.unwrap_or(Icon::Unknown),
                timeout_ms: handle.timeout_ms,
            });
            Ok(())
        }

        fn reconnect(&mut self) -> std::result::Result<(), SinkError> {
            self.reconnects += 1;
            if self.reconnect_fails {
                return Err(SinkError::Unavailable("no session bus".to_string()));
            }
            Ok(())
        }

        fn supports_markup(&self) -> bool {
            self.markup
        }
    }

    /// Replays a fixed list of wakeups, then reports shutdown
    struct ScriptedSource {
        wakeups: VecDeque<Wakeup>,
    }

    impl ScriptedSource {
        fn new(events: Vec<DeviceEvent>) -> Self {
            Self {
                wakeups: events.into_iter().map(Wakeup::Event).collect(),
            }
        }
    }

    impl EventSource for ScriptedSource {
        fn wait(&mut self, _shutdown: &mut Shutdown) -> std::io::Result<Wakeup> {
            Ok(self.wakeups.pop_front().unwrap_or(Wakeup::Shutdown))
        }
    }

    fn test_config() -> Config {
        Config {
            timeout_ms: 3000,
            throttle: Duration::ZERO,
            retry: RetryPolicy {
                max_reconnects: 2,
                delay: Duration::ZERO,
            },
            ..Config::default()
        }
    }

    fn context() -> Context {
        Context {
            config: test_config(),
            shutdown: Shutdown::new().unwrap(),
        }
    }

    fn sda1_add() -> DeviceEvent {
        DeviceEvent::new(Action::Add, "sda1", DeviceNumber::new(8, 1))
            .with_attribute("ID_FS_LABEL", "DATA")
            .with_attribute("ID_FS_TYPE", "ext4")
            .with_attribute("ID_BUS", "ata")
    }

    #[test]
    fn test_pipeline_shows_notification() {
        let mut daemon = Daemon::new(MemorySink::default(), &test_config());

        assert!(daemon.handle_event(sda1_add()).unwrap());

        let shown = &daemon.sink().shown;
        assert_eq!(
            shown,
            &[Shown {
                handle: 1,
                title: "Udev Block Notification".to_string(),
                body: "Device sda1 (8:1) appeared.\nLabel: DATA\nType: ext4".to_string(),
                icon: Icon::Harddisk,
                timeout_ms: 3000,
            }]
        );
    }

    #[test]
    fn test_markup_when_supported() {
        let sink = MemorySink {
            markup: true,
            ..MemorySink::default()
        };
        let mut daemon = Daemon::new(sink, &test_config());

        daemon.handle_event(sda1_add()).unwrap();
        assert!(daemon.sink().shown[0].body.starts_with("Device <b>sda1</b>"));
    }

    #[test]
    fn test_filtered_event_creates_nothing() {
        let mut daemon = Daemon::new(MemorySink::default(), &test_config());
        let unnamed_dm = DeviceEvent::new(Action::Add, "dm-3", DeviceNumber::new(253, 3));

        assert!(!daemon.handle_event(unnamed_dm).unwrap());
        assert_eq!(daemon.sink().created, 0);
        assert!(daemon.sink().shown.is_empty());
        assert!(daemon.registry.is_empty());
    }

    #[test]
    fn test_same_device_reuses_notification() {
        let mut daemon = Daemon::new(MemorySink::default(), &test_config());
        let sdb = DeviceNumber::new(8, 16);

        daemon.handle_event(sda1_add()).unwrap();
        daemon
            .handle_event(DeviceEvent::new(Action::Add, "sdb", sdb).with_attribute("ID_BUS", "usb"))
            .unwrap();
        daemon
            .handle_event(DeviceEvent::new(Action::Remove, "sdb", sdb).with_attribute("ID_BUS", "usb"))
            .unwrap();

        let shown = &daemon.sink().shown;
        assert_eq!(shown.len(), 3);
        assert_eq!(shown[1].handle, shown[2].handle);
        assert_ne!(shown[0].handle, shown[1].handle);
        assert_eq!(shown[2].body, "Device sdb (8:16) disappeared.");
        assert_eq!(shown[2].icon, Icon::HarddiskUsb);
        assert_eq!(daemon.sink().created, 2);
    }

    #[test]
    fn test_reconnect_recovers() {
        let sink = MemorySink {
            failures: 2,
            ..MemorySink::default()
        };
        let mut daemon = Daemon::new(sink, &test_config());

        assert!(daemon.handle_event(sda1_add()).unwrap());
        assert_eq!(daemon.sink().reconnects, 2);
        assert_eq!(daemon.sink().shown.len(), 1);
    }

    #[test]
    fn test_retries_exhausted() {
        let sink = MemorySink {
            failures: 3,
            ..MemorySink::default()
        };
        let mut daemon = Daemon::new(sink, &test_config());

        let err = daemon.handle_event(sda1_add()).unwrap_err();
        assert!(matches!(err, AppError::SinkDisplay { attempts: 2, .. }));
        assert_eq!(daemon.sink().reconnects, 2);
        assert!(daemon.sink().shown.is_empty());
    }

    #[test]
    fn test_failed_reconnect_uses_attempt() {
        let sink = MemorySink {
            failures: u32::MAX,
            reconnect_fails: true,
            ..MemorySink::default()
        };
        let mut daemon = Daemon::new(sink, &test_config());

        // Each failed reconnect counts, so the loop gives up after two
        let err = daemon.handle_event(sda1_add()).unwrap_err();
        assert!(matches!(err, AppError::SinkDisplay { attempts: 2, .. }));
        assert_eq!(daemon.sink().reconnects, 2);
        assert!(daemon.sink().shown.is_empty());
    }

    #[test]
    fn test_attempts_reset_per_event() {
        let sink = MemorySink {
            failures: 2,
            ..MemorySink::default()
        };
        let mut daemon = Daemon::new(sink, &test_config());

        daemon.handle_event(sda1_add()).unwrap();
        daemon.sink.failures = 2;
        daemon.handle_event(sda1_add()).unwrap();

        assert_eq!(daemon.sink().reconnects, 4);
        assert_eq!(daemon.sink().shown.len(), 2);
    }

    #[test]
    fn test_run_processes_until_shutdown() {
        let mut ctx = context();
        let mut daemon = Daemon::new(MemorySink::default(), &ctx.config);
        let mut source = ScriptedSource::new(vec![
            sda1_add(),
            DeviceEvent::new(Action::Add, "dm-0", DeviceNumber::new(253, 0)),
            DeviceEvent::new(Action::Change, "dm-2", DeviceNumber::new(253, 2))
                .with_attribute("DM_NAME", "vg0-swap"),
        ]);

        daemon.run(&mut ctx, &mut source).unwrap();

        let shown = &daemon.sink().shown;
        assert_eq!(shown.len(), 2);
        assert!(shown[1].body.contains("Device mapper name: vg0-swap"));
        assert_eq!(shown[1].icon, Icon::DeviceMapper);
    }

    #[test]
    fn test_run_skips_idle_wakeups() {
        let mut ctx = context();
        let mut daemon = Daemon::new(MemorySink::default(), &ctx.config);
        let mut source = ScriptedSource {
            wakeups: VecDeque::from([Wakeup::Idle, Wakeup::Event(sda1_add()), Wakeup::Idle]),
        };

        daemon.run(&mut ctx, &mut source).unwrap();
        assert_eq!(daemon.sink().shown.len(), 1);
    }

    #[test]
    fn test_stop_flag_checked_before_waiting() {
        let mut ctx = context();
        ctx.shutdown.trigger().unwrap().fire();

        let mut daemon = Daemon::new(MemorySink::default(), &ctx.config);
        let mut source = ScriptedSource::new(vec![sda1_add()]);

        daemon.run(&mut ctx, &mut source).unwrap();
        assert!(daemon.sink().shown.is_empty());
        assert_eq!(source.wakeups.len(), 1);
    }

    #[test]
    fn test_run_stops_on_fatal_display_error() {
        let mut ctx = context();
        let sink = MemorySink {
            failures: u32::MAX,
            ..MemorySink::default()
        };
        let mut daemon = Daemon::new(sink, &ctx.config);
        let mut source = ScriptedSource::new(vec![sda1_add(), sda1_add()]);

        let err = daemon.run(&mut ctx, &mut source).unwrap_err();
        assert!(matches!(err, AppError::SinkDisplay { .. }));
        assert_eq!(source.wakeups.len(), 1);
    }
}
