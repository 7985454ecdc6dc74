/// Errors raised while gathering environment facts.
///
/// Collectors log these and fall back to sentinel values; they never reach
/// the prompt itself.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine home directory")]
    MissingHome,

    #[error("Unrecognised token expiry: {0}")]
    InvalidExpiry(String),
}

/// Result type alias for status collection
pub type StatusResult<T> = Result<T, StatusError>;
