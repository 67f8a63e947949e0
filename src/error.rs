//! Error types for the simulation's fallible edges.
//!
//! Purchases and clicks never fail loudly; they report `false`/`None`.
//! Only save import, storage, config loading and presenters produce errors.

use thiserror::Error;

/// Why a save string could not be turned back into a snapshot.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Neither base64-wrapped JSON nor raw JSON.
    #[error("save data is not valid base64 or JSON")]
    Decode,

    /// The text looked like JSON but did not match the snapshot layout.
    #[error("invalid save: {0}")]
    Parse(#[from] serde_json::Error),

    /// Saved by a format this build can no longer migrate.
    #[error("save version {found} is older than the minimum compatible version {min}")]
    IncompatibleVersion {
        /// Version stored in the save.
        found: u32,
        /// Oldest version still accepted.
        min: u32,
    },

    /// Serializing the current state failed.
    #[error("failed to encode save: {0}")]
    Encode(String),
}

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("failed to write save: {0}")]
    Write(String),
}

/// Problems with a user-supplied [`crate::config::SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Returned by a presenter that failed to render an event.
#[derive(Debug, Error)]
#[error("presenter failed: {0}")]
pub struct PresentError(pub String);
