//! # Auth Emulator
//!
//! Credential checks against the users table and a single in-memory
//! session, with change notifications.
//!
//! ## Invariants
//! - Calls never panic and never return `Err`; failures travel in the
//!   envelope
//! - A failed sign-in or sign-up leaves the session untouched
//! - Every transition is dispatched while the session lock is held, so
//!   listeners observe transitions in the order they happened
//! - `sign_out` always succeeds and always emits `SIGNED_OUT`

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::crypto::verify_secret;
use super::errors::{AuthError, AuthResult};
use super::events::{spawn_delivery, AuthEvent, AuthSubscription, ListenerRegistry};
use super::session::{AuthState, Session};
use super::user::{default_display_name, Credentials, SignUpRequest, User};
use crate::errors::ErrorDescriptor;
use crate::fixtures::{FixtureStore, TableName};
use crate::observability::{log_event_with_fields, Event};

/// Timing knobs for the emulator
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Delay before sign-in and sign-up resolve
    pub latency: Duration,
    /// Delay before a new listener's first event
    pub listener_delay: Duration,
    pub session_ttl: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
            listener_delay: Duration::from_millis(100),
            session_ttl: chrono::Duration::hours(1),
        }
    }
}

/// `{data, error}` returned by every auth call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthEnvelope<T> {
    pub data: T,
    pub error: Option<ErrorDescriptor>,
}

impl<T> AuthEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<T, ErrorDescriptor> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T: Default> AuthEnvelope<T> {
    /// Empty data plus the error
    pub fn failure(error: impl Into<ErrorDescriptor>) -> Self {
        Self {
            data: T::default(),
            error: Some(error.into()),
        }
    }
}

/// Payload of sign-in and sign-up
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            user: Some(session.user.clone()),
            session: Some(session),
        }
    }
}

/// Payload of `get_session`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionData {
    pub session: Option<Session>,
}

/// Payload of `get_user`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserData {
    pub user: Option<User>,
}

/// Session state machine over the users table
#[derive(Debug)]
pub struct AuthEmulator {
    store: Arc<FixtureStore>,
    session: RwLock<Option<Session>>,
    listeners: Arc<ListenerRegistry>,
    config: AuthConfig,
}

impl AuthEmulator {
    /// Anonymous emulator over `store`
    pub fn new(store: Arc<FixtureStore>, config: AuthConfig) -> Self {
        Self {
            store,
            session: RwLock::new(None),
            listeners: Arc::new(ListenerRegistry::new()),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Current state; an expired session counts as anonymous
    pub fn state(&self) -> AuthState {
        AuthState::of(self.current_session().as_ref())
    }

    /// Copy of the live session, if any
    pub fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|s| !s.is_expired())
            .cloned()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    /// Sign in with an exact email/password match
    pub async fn sign_in_with_password(&self, credentials: Credentials) -> AuthEnvelope<AuthResponse> {
        tokio::time::sleep(self.config.latency).await;

        match self.try_sign_in(&credentials) {
            Ok(session) => {
                log_event_with_fields(Event::AuthSignedIn, &[("user_id", session.user.id.as_str())]);
                AuthEnvelope::ok(session.into())
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(Event::AuthSignInFailed, &[("reason", reason.as_str())]);
                AuthEnvelope::failure(e)
            }
        }
    }

    /// Register a new account and sign it in
    pub async fn sign_up(&self, request: SignUpRequest) -> AuthEnvelope<AuthResponse> {
        tokio::time::sleep(self.config.latency).await;

        match self.try_sign_up(request) {
            Ok(session) => {
                log_event_with_fields(Event::AuthSignedUp, &[("user_id", session.user.id.as_str())]);
                AuthEnvelope::ok(session.into())
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(Event::AuthSignUpRejected, &[("reason", reason.as_str())]);
                AuthEnvelope::failure(e)
            }
        }
    }

    /// Clear the session
    pub async fn sign_out(&self) -> AuthEnvelope<()> {
        tokio::task::yield_now().await;

        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        *session = None;
        self.listeners.dispatch(&AuthEvent::signed_out());
        drop(session);

        log_event_with_fields(Event::AuthSignedOut, &[]);
        AuthEnvelope::ok(())
    }

    pub async fn get_session(&self) -> AuthEnvelope<SessionData> {
        tokio::task::yield_now().await;
        AuthEnvelope::ok(SessionData {
            session: self.current_session(),
        })
    }

    pub async fn get_user(&self) -> AuthEnvelope<UserData> {
        tokio::task::yield_now().await;
        AuthEnvelope::ok(UserData {
            user: self.current_session().map(|s| s.user),
        })
    }

    /// Register `listener` for session transitions.
    ///
    /// The first event describes the current state and arrives after the
    /// configured listener delay. Must be called inside a Tokio runtime.
    pub fn on_auth_state_change<F>(&self, listener: F) -> AuthSubscription
    where
        F: FnMut(AuthEvent) + Send + 'static,
    {
        // Hold the read lock so no transition slips between the initial
        // event and registration
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        let initial = AuthEvent::current(session.as_ref().filter(|s| !s.is_expired()));
        let (id, receiver, active) = self.listeners.connect(initial);
        drop(session);

        spawn_delivery(receiver, Arc::clone(&active), self.config.listener_delay, listener);

        let listener_id = id.to_string();
        log_event_with_fields(Event::AuthListenerAdded, &[("listener", listener_id.as_str())]);
        AuthSubscription::new(id, active, &self.listeners)
    }

    /// Sign in a seeded account without a password check. Used to start a
    /// client already authenticated.
    pub(crate) fn sign_in_as(&self, email: &str) -> AuthResult<Session> {
        let user = self
            .store
            .find_user_by_email(email)?
            .as_ref()
            .and_then(User::from_row)
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(self.establish(user))
    }

    fn try_sign_in(&self, credentials: &Credentials) -> AuthResult<Session> {
        let row = self
            .store
            .find_user_by_email(&credentials.email)?
            .ok_or(AuthError::InvalidCredentials)?;

        let stored = row.get("password").and_then(Value::as_str);
        match stored {
            Some(stored) if verify_secret(&credentials.password, stored) => {}
            _ => return Err(AuthError::InvalidCredentials),
        }

        let user = User::from_row(&row).ok_or(AuthError::InvalidCredentials)?;
        Ok(self.establish(user))
    }

    fn try_sign_up(&self, request: SignUpRequest) -> AuthResult<Session> {
        let display_name = request
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_display_name(&request.email));
        let user = User {
            id: format!("new_user_{}", Uuid::new_v4().simple()),
            email: request.email,
            display_name,
        };

        self.store.with_tables_mut(|tables| {
            let taken = tables
                .rows(TableName::Users)
                .iter()
                .any(|row| row.get("email").and_then(Value::as_str) == Some(user.email.as_str()));
            if taken {
                return Err(AuthError::DuplicateAccount);
            }
            tables
                .rows_mut(TableName::Users)
                .push(user.to_row(&request.password));
            tables
                .rows_mut(TableName::Profiles)
                .push(user.to_profile_row());
            Ok(())
        })??;

        Ok(self.establish(user))
    }

    fn establish(&self, user: User) -> Session {
        let session = Session::new(user, self.config.session_ttl);
        let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(session.clone());
        self.listeners.dispatch(&AuthEvent::signed_in(session.clone()));
        session
    }
}
