use thiserror::Error;

/// Failures that abort a capture. Everything else degrades to empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("table not found")]
    TableNotFound,

    #[error("timeout")]
    Timeout,

    #[error("document source failed: {0}")]
    Source(String),
}
