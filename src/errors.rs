//! # Client Errors
//!
//! Every failure reaches callers through an envelope's `error` field as an
//! [`ErrorDescriptor`]; nothing on the data path returns `Err` or panics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::query::QueryError;

/// Result type for client-level operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Machine-readable error category carried in envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidCredentials,
    DuplicateAccount,
    InvalidQueryState,
    Unimplemented,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCredentials => "invalid_credentials",
            ErrorCode::DuplicateAccount => "duplicate_account",
            ErrorCode::InvalidQueryState => "invalid_query_state",
            ErrorCode::Unimplemented => "unimplemented",
            ErrorCode::Internal => "internal",
        }
    }
}

/// Error as it appears in an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub message: String,
    pub code: ErrorCode,
}

impl ErrorDescriptor {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl std::fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code.as_str())
    }
}

/// Any error the client facade can produce
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Query builder error
    #[error("{0}")]
    Query(#[from] QueryError),

    /// Auth emulator error
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Remote procedure calls are placeholders
    #[error("Remote procedure not implemented: {0}")]
    Unimplemented(String),
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Query(e) => e.code(),
            ClientError::Auth(e) => e.code(),
            ClientError::Unimplemented(_) => ErrorCode::Unimplemented,
        }
    }

    /// Returns the HTTP status code a real backend would answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::Query(e) => e.status_code(),
            ClientError::Auth(e) => e.status_code(),
            ClientError::Unimplemented(_) => 501,
        }
    }
}

impl From<ClientError> for ErrorDescriptor {
    fn from(err: ClientError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<QueryError> for ErrorDescriptor {
    fn from(err: QueryError) -> Self {
        ClientError::from(err).into()
    }
}

impl From<AuthError> for ErrorDescriptor {
    fn from(err: AuthError) -> Self {
        ClientError::from(err).into()
    }
}
