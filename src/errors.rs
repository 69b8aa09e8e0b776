use thiserror::Error;

/// Error type that captures storage, configuration and CLI failures.
#[derive(Debug, Error)]
pub enum WorklogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("{kind} record `{id}` not found")]
    NotFound { kind: String, id: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Usage(String),
}

/// Malformed values received from the record store.
///
/// These never reach the rendering layer: the tolerant entry points replace them
/// with the "no date" sentinel or a zero amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid date input: `{0}`")]
    InvalidDateInput(String),
    #[error("invalid amount: `{0}`")]
    InvalidAmount(String),
}

pub type Result<T> = std::result::Result<T, WorklogError>;
