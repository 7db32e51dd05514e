//! Error taxonomy for the pagination core.

use thiserror::Error;

/// Failures surfaced by a paginated listing request.
///
/// An empty page is never reported through this type: a request that matches
/// nothing succeeds with zero edges.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The `after` token is malformed, truncated or carries an unknown tag.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// `first` is outside the accepted range once clamping has been applied.
    #[error("Invalid page size: {0} (must be at least 1)")]
    InvalidPageSize(i32),

    /// The backing store failed while counting or fetching rows.
    #[error("Data store error: {0}")]
    DataStore(#[from] anyhow::Error),
}

impl PaginationError {
    pub(crate) fn invalid_cursor(reason: impl Into<String>) -> Self {
        Self::InvalidCursor(reason.into())
    }
}

/// Result type for pagination operations.
pub type PaginationResult<T> = Result<T, PaginationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_keep_their_message() {
        let err: PaginationError = anyhow::anyhow!("connection reset").into();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_page_size_error_names_the_value() {
        let err = PaginationError::InvalidPageSize(-3);
        assert!(err.to_string().contains("-3"));
    }
}
