//! Error types for Clipwise.

use thiserror::Error;

/// Library-level error type for Clipwise operations.
#[derive(Error, Debug)]
pub enum ClipwiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The credential could not be validated against the model backend.
    #[error("Session error: {0}")]
    Session(String),

    /// Transport, auth or quota failure reported by the model backend.
    #[error("Model service error: {0}")]
    Service(String),

    /// The planner's tool decision could not be understood.
    #[error("Planning error: {0}")]
    Planning(String),

    #[error("No transcript available: {0}")]
    TranscriptAbsent(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl ClipwiseError {
    /// Whether this error is a rejected input the caller must react to.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClipwiseError::Validation(_))
    }
}

/// Result type alias for Clipwise operations.
pub type Result<T> = std::result::Result<T, ClipwiseError>;
