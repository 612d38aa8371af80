//! Error types for the to-do application.
//!
//! Storage and notification errors are non-fatal by policy: the UI logs them
//! and carries on. Only the binary's start-up path (config, logging, terminal)
//! turns an error into a non-zero exit.

use std::io;

/// Failure reading or writing a storage slot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The slot exists but could not be read.
    #[error("failed to read slot `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The slot could not be written.
    #[error("failed to write slot `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The slot holds something that is not a valid task list.
    #[error("failed to decode slot `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory value could not be serialized.
    #[error("failed to encode slot `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The background writer has shut down and can no longer accept saves.
    #[error("storage writer is no longer running")]
    WriterGone,
}

/// Failure talking to the notification scheduler.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The user (or config) has not allowed notifications.
    #[error("notification permission denied")]
    PermissionDenied,

    /// The reminder queue could not be persisted.
    #[error("reminder storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Failure loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error surfaced by the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("logging error: {0}")]
    Logging(String),

    /// Bad user input on the command line.
    #[error("{0}")]
    Input(String),
}

/// Convenience result type for the binary.
pub type Result<T> = std::result::Result<T, AppError>;
