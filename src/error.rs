// src/error.rs
// Error types for the idea pipeline

use thiserror::Error;

/// Main error type for the sillygen library
#[derive(Error, Debug)]
pub enum IdeaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("example store error: {0}")]
    Retrieval(String),

    #[error("fallback catalog error: {0}")]
    Catalog(String),

    #[error("generation error: {0}")]
    Generation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using IdeaError
pub type Result<T> = std::result::Result<T, IdeaError>;

impl IdeaError {
    /// True for failures that must stop the process before any session exists
    pub fn is_fatal(&self) -> bool {
        matches!(self, IdeaError::Config(_))
    }
}
