//! # Session
//!
//! The signed-in state held by the auth emulator.
//!
//! ## Invariants
//! - At most one session per emulator
//! - A session always carries the user it was created for

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::crypto::generate_token;
use super::user::User;

/// Session model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User this session belongs to
    pub user: User,

    /// Opaque bearer token
    pub access_token: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `user` lasting `ttl`
    pub fn new(user: User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user,
            access_token: generate_token(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Emulator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

impl AuthState {
    pub fn of(session: Option<&Session>) -> Self {
        match session {
            Some(_) => AuthState::Authenticated,
            None => AuthState::Anonymous,
        }
    }
}
