// SPDX-License-Identifier: GPL-3.0-only
//! Runtime configuration
//!
//! There is no configuration file; everything is derived from the command
//! line with the defaults below.

use std::time::Duration;

use crate::cli::Cli;

pub const PROGNAME: &str = "udev-block-notify";

/// Default on-screen duration of a notification
pub const NOTIFICATION_TIMEOUT_MS: i32 = 10_000;

/// Reconnect attempts before a display failure becomes fatal
pub const MAX_RECONNECTS: u32 = 2;
pub const RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// Pause after each loop iteration so a misbehaving source can't spin the CPU
pub const LOOP_THROTTLE: Duration = Duration::from_millis(50);

/// What to do when showing a notification fails
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_reconnects: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_reconnects: MAX_RECONNECTS,
            delay: RECONNECT_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub timeout_ms: i32,
    /// Number of `-v` flags
    pub verbosity: u8,
    pub retry: RetryPolicy,
    pub throttle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: NOTIFICATION_TIMEOUT_MS,
            verbosity: 0,
            retry: RetryPolicy::default(),
            throttle: LOOP_THROTTLE,
        }
    }
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            timeout_ms: cli.timeout_ms(),
            verbosity: cli.verbose,
            ..Self::default()
        }
    }

    /// Log filter directive for our own crate
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
