//! Observable events for mockbase
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events emitted by the data-access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Query builder
    /// A read or write resolved successfully
    QueryResolved,
    /// A builder was resolved in an invalid state
    QueryRejected,
    /// A query named a table the emulator does not expose
    UnknownTable,
    /// A write changed the fixture store
    WriteApplied,

    // Auth emulator
    /// Credentials matched and a session was created
    AuthSignedIn,
    /// Credentials did not match
    AuthSignInFailed,
    /// A new account was registered
    AuthSignedUp,
    /// A sign-up collided with an existing account
    AuthSignUpRejected,
    /// The session was cleared
    AuthSignedOut,
    /// A state-change listener was registered
    AuthListenerAdded,
    /// A state-change listener was removed
    AuthListenerRemoved,

    // Client
    /// A remote procedure placeholder was invoked
    RpcCalled,
    /// Configuration loaded from disk
    ConfigLoaded,
}

impl Event {
    /// Returns the event name as it appears in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryResolved => "QUERY_RESOLVED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::UnknownTable => "UNKNOWN_TABLE",
            Event::WriteApplied => "WRITE_APPLIED",
            Event::AuthSignedIn => "AUTH_SIGNED_IN",
            Event::AuthSignInFailed => "AUTH_SIGN_IN_FAILED",
            Event::AuthSignedUp => "AUTH_SIGNED_UP",
            Event::AuthSignUpRejected => "AUTH_SIGN_UP_REJECTED",
            Event::AuthSignedOut => "AUTH_SIGNED_OUT",
            Event::AuthListenerAdded => "AUTH_LISTENER_ADDED",
            Event::AuthListenerRemoved => "AUTH_LISTENER_REMOVED",
            Event::RpcCalled => "RPC_CALLED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryRejected | Event::UnknownTable => Severity::Warn,
            Event::AuthSignInFailed | Event::AuthSignUpRejected => Severity::Info,
            Event::QueryResolved | Event::AuthListenerAdded | Event::AuthListenerRemoved => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
