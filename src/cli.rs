// SPDX-License-Identifier: GPL-3.0-only
// CLI definitions using clap

use clap::{ArgAction, Parser};

use crate::config::{NOTIFICATION_TIMEOUT_MS, PROGNAME};

#[derive(Parser, Debug)]
#[command(name = PROGNAME)]
#[command(version, about = "Desktop notifications for block device hotplug events")]
pub struct Cli {
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Notification timeout in seconds
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        default_value_t = NOTIFICATION_TIMEOUT_MS as f64 / 1000.0,
        value_parser = parse_timeout
    )]
    pub timeout: f64,
}

impl Cli {
    pub fn timeout_ms(&self) -> i32 {
        // Float to int casts saturate, huge values end up as i32::MAX
        (self.timeout * 1000.0).round() as i32
    }
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let seconds: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("timeout must be a non-negative number, got {s}"));
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_timeout_conversion() {
        let cli = Cli::try_parse_from([PROGNAME, "-t", "2.5"]).unwrap();
        assert_eq!(cli.timeout_ms(), 2500);

        let cli = Cli::try_parse_from([PROGNAME, "--timeout", "0.0004"]).unwrap();
        assert_eq!(cli.timeout_ms(), 0);

        let cli = Cli::try_parse_from([PROGNAME, "--timeout=1e12"]).unwrap();
        assert_eq!(cli.timeout_ms(), i32::MAX);
    }

    #[test]
    fn test_invalid_timeout() {
        for bad in ["-1", "abc", "inf", "NaN"] {
            let arg = format!("--timeout={bad}");
            let err = Cli::try_parse_from([PROGNAME, arg.as_str()]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "value {bad}");
        }
    }

    #[test]
    fn test_help_and_version() {
        let err = Cli::try_parse_from([PROGNAME, "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from([PROGNAME, "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from([PROGNAME, "--config", "x"]).is_err());
    }
}
