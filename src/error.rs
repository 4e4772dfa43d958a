//! Error types for the call-log analytics engine.

use thiserror::Error;

/// Errors surfaced by a load cycle or its collaborators.
///
/// Per-record defects (bad durations, unparsable timestamps, unknown call
/// types) never show up here: they are absorbed with defaults while
/// decoding and classifying.
#[derive(Error, Debug)]
pub enum Error {
    /// A raw collection could not be obtained at all.
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// The platform has no such source.
    #[error("{source_name} is not supported on this platform")]
    Unsupported { source_name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
