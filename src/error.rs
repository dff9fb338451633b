use thiserror::Error;

/// A candidate record was rejected before reaching the store.
///
/// Carries the name of the first offending field; validation is fail-fast
/// and reports one field per call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for field: {0}")]
    InvalidField(&'static str),
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) | ValidationError::InvalidField(field) => field,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no record with id {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

/// Non-fatal condition attached to a read: the operation returned data, but
/// the caller should log or alert.
#[derive(Debug, Clone, Error)]
pub enum StoreWarning {
    #[error("degraded read: {path} was unreadable ({detail}); serving seed data")]
    DegradedRead { path: String, detail: String },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("photo upload timed out")]
    Timeout,

    #[error("photo upload failed with status {0}")]
    Status(u16),

    #[error("photo upload failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upload response missing secure_url")]
    MalformedResponse,
}
