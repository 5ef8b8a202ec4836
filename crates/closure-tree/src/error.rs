use thiserror::Error;

use crate::model::CategoryId;

/// Errors that can occur during tree operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A caller-supplied id or parameter violates a documented precondition
    /// (negative id, non-positive depth, moving a node under itself, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation targets a category that does not exist.
    #[error("Category not found: {0}")]
    NotFound(CategoryId),

    /// The operation is categorically rejected for the root category.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An error originating from the underlying SQLite database. The
    /// surrounding transaction has been rolled back.
    #[error("SQLite error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The stored `extra` attributes could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TreeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Coarse classification of a [`TreeError`], for adapters that translate
/// engine failures into client/server error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    UnsupportedOperation,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }

    /// True for the kinds caused by the caller rather than the backing store.
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorKind::StorageFailure)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            TreeError::NotFound(_) => ErrorKind::NotFound,
            TreeError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            TreeError::Storage(_) | TreeError::Serialization(_) => ErrorKind::StorageFailure,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Fails with [`TreeError::InvalidArgument`] unless `value > 0`.
pub(crate) fn check_positive(value: i64, name: &str) -> TreeResult<()> {
    if value <= 0 {
        return Err(TreeError::InvalidArgument(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Fails with [`TreeError::InvalidArgument`] if `value < 0`.
pub(crate) fn check_not_negative(value: i64, name: &str) -> TreeResult<()> {
    if value < 0 {
        return Err(TreeError::InvalidArgument(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_client_or_server_errors() {
        assert!(TreeError::NotFound(3).kind().is_client_error());
        assert!(TreeError::InvalidArgument("x".into()).kind().is_client_error());
        assert!(!TreeError::Storage(rusqlite::Error::InvalidQuery)
            .kind()
            .is_client_error());
        assert_eq!(
            TreeError::UnsupportedOperation("root".into()).kind().as_str(),
            "unsupported_operation"
        );
    }

    #[test]
    fn argument_checks() {
        assert!(check_positive(1, "n").is_ok());
        assert!(check_positive(0, "n").is_err());
        assert!(check_not_negative(0, "id").is_ok());
        let msg = check_not_negative(-4, "id").unwrap_err().to_string();
        assert!(msg.contains("id must not be negative, got -4"));
    }
}
