//! Error types for the sync client.
//!
//! # Design
//! Each stage of a run has its own error enum so callers can tell a bad
//! environment (`ConfigError`) from a bad task file (`InputError`), a failed
//! exchange (`TransportError`) and a reply the service rejected or that could
//! not be read (`ApiError`).

use std::path::PathBuf;

/// Errors raised while assembling `Settings`. All of them are fatal and occur
/// before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No bearer token was supplied, or it was blank.
    #[error("missing API token: set TODOIST_KEY")]
    MissingToken,

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Todoist priorities run from 1 (normal) to 4 (urgent).
    #[error("priority must be between 1 and 4, got {0}")]
    InvalidPriority(u8),
}

/// Errors raised while loading the task list.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read task file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed task list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("task {index} has an empty name")]
    EmptyName { index: usize },

    #[error("invalid time of day {0:?}: expected HH:MM")]
    InvalidTimeOfDay(String),
}

/// The request never completed: DNS, connect, TLS or I/O failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Errors returned by `SyncClient` build and parse methods.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The server returned 401 or 403; the token was rejected.
    #[error("token rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
