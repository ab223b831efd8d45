//! # Auth Module
//!
//! An in-process stand-in for a hosted auth service: email/password
//! sign-in against the users table, one session per emulator, and
//! `SIGNED_IN`/`SIGNED_OUT` notifications.

pub mod crypto;
pub mod emulator;
pub mod errors;
pub mod events;
pub mod session;
pub mod user;

pub use emulator::{AuthConfig, AuthEmulator, AuthEnvelope, AuthResponse, SessionData, UserData};
pub use errors::{AuthError, AuthResult};
pub use events::{AuthEvent, AuthEventKind, AuthSubscription, ListenerRegistry};
pub use session::{AuthState, Session};
pub use user::{Credentials, SignUpRequest, User};
