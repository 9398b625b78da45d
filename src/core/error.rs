//! Error types for the update and read pipelines

use thiserror::Error;

/// Failures of the update pipeline. Every variant is fatal for a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to download exchange rates from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse exchange rates: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures talking to the key-value table.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed item '{id}': {reason}")]
    MalformedItem { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
