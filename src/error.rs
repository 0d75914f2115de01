// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the application
//!
//! Initialization failures and exhausted display retries are fatal and end
//! the process. Missing device attributes are never errors.
//!
//! Messages leave out the underlying cause; it is reported through
//! `source()` and printed as part of the error chain.

use thiserror::Error;

use crate::notify::SinkError;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The udev monitor could not be created
    #[error("Can't create udev monitor")]
    SourceInit(#[source] std::io::Error),

    /// The notification service could not be reached at startup
    #[error("Can't connect to notification service")]
    SinkInit(#[source] SinkError),

    /// Showing a notification kept failing after reconnecting
    #[error("Can't reconnect to notification service after {attempts} attempt(s)")]
    SinkDisplay {
        attempts: u32,
        #[source]
        source: SinkError,
    },

    /// Signal handler installation failed
    #[error("Can't install signal handler")]
    Signal(#[from] ctrlc::Error),

    /// Waiting on the event source failed
    #[error("Event source failed")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
