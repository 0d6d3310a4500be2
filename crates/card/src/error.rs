//! Error types for card rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when writing a status card.
#[derive(Debug, Error)]
pub enum CardError {
    /// Card could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing to a card file failed
    #[error("Failed to write card to {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to a standard stream failed
    #[error("Failed to write card to {stream}: {source}")]
    Stream {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },
}
