//! # Auth Errors
//!
//! Error types for the auth emulator.

use thiserror::Error;

use crate::errors::ErrorCode;
use crate::fixtures::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================

    /// Email/password pair matched no user (generic - don't leak which part failed)
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Email already registered
    #[error("Email already registered")]
    DuplicateAccount,

    // ==================
    // Internal Errors
    // ==================

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Envelope error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::DuplicateAccount => ErrorCode::DuplicateAccount,
            AuthError::StorageError(_) => ErrorCode::Internal,
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::DuplicateAccount => 409,
            AuthError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::StorageError(err.to_string())
    }
}
