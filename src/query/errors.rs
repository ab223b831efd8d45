//! # Query Errors
//!
//! Error types for the query builder.

use thiserror::Error;

use crate::errors::ErrorCode;
use crate::fixtures::StoreError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query builder errors
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The builder was used in a way the contract forbids, e.g. ordering a
    /// delete or selecting with unbalanced parentheses
    #[error("Invalid query state: {0}")]
    InvalidQueryState(String),

    /// Fixture store failure
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        QueryError::InvalidQueryState(message.into())
    }

    /// Envelope error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::InvalidQueryState(_) => ErrorCode::InvalidQueryState,
            QueryError::Store(_) => ErrorCode::Internal,
        }
    }

    /// Returns the HTTP status code a real backend would answer with
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::InvalidQueryState(_) => 400,
            QueryError::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(QueryError::invalid("x").status_code(), 400);
        assert_eq!(
            QueryError::Store(StoreError::LockPoisoned("t")).status_code(),
            500
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(QueryError::invalid("x").code(), ErrorCode::InvalidQueryState);
        assert_eq!(
            QueryError::from(StoreError::LockPoisoned("t")).code(),
            ErrorCode::Internal
        );
    }

    #[test]
    fn test_message_carries_detail() {
        let err = QueryError::invalid("order() after delete()");
        assert!(err.to_string().contains("order() after delete()"));
    }
}
