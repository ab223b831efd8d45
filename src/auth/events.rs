//! # Auth State Events
//!
//! Fan-out of session transitions to registered listeners.
//!
//! Each listener owns an unbounded channel drained by its own task, so a
//! slow listener never blocks a transition or another listener. Events
//! reach a listener in the order they were dispatched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

use super::session::Session;
use crate::observability::{log_event_with_fields, Event};

/// Event sender for a listener
pub type EventSender = mpsc::UnboundedSender<AuthEvent>;

/// Event receiver for a listener
pub type EventReceiver = mpsc::UnboundedReceiver<AuthEvent>;

/// Kind of session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
}

impl AuthEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventKind::SignedIn => "SIGNED_IN",
            AuthEventKind::SignedOut => "SIGNED_OUT",
        }
    }
}

impl std::fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivered to listeners on every transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    pub fn signed_in(session: Session) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            session: None,
        }
    }

    /// Event describing the state a new listener joins in
    pub fn current(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Self::signed_in(session.clone()),
            None => Self::signed_out(),
        }
    }
}

#[derive(Debug)]
struct Listener {
    sender: EventSender,
    active: Arc<AtomicBool>,
}

/// Registered listeners
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener whose queue starts with `initial`
    pub fn connect(&self, initial: AuthEvent) -> (u64, EventReceiver, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // The receiver is still held here, so this cannot fail
        let _ = tx.send(initial);

        if let Ok(mut listeners) = self.listeners.write() {
            listeners.insert(
                id,
                Listener {
                    sender: tx,
                    active: Arc::clone(&active),
                },
            );
        }

        (id, rx, active)
    }

    /// Remove a listener; its queue is closed
    pub fn disconnect(&self, id: u64) {
        if let Ok(mut listeners) = self.listeners.write() {
            if let Some(listener) = listeners.remove(&id) {
                listener.active.store(false, Ordering::Release);
            }
        }
    }

    /// Queue `event` for every active listener. Returns how many accepted it.
    pub fn dispatch(&self, event: &AuthEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        if let Ok(listeners) = self.listeners.read() {
            for (id, listener) in listeners.iter() {
                if !listener.active.load(Ordering::Acquire) {
                    continue;
                }
                match listener.sender.send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => closed.push(*id),
                }
            }
        }

        for id in closed {
            self.disconnect(id);
        }

        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }
}

/// Drain a listener's queue on a background task after `delay`.
///
/// Must be called inside a Tokio runtime.
pub(crate) fn spawn_delivery<F>(
    mut receiver: EventReceiver,
    active: Arc<AtomicBool>,
    delay: Duration,
    mut listener: F,
) where
    F: FnMut(AuthEvent) + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        while let Some(event) = receiver.recv().await {
            if !active.load(Ordering::Acquire) {
                break;
            }
            listener(event);
        }
    });
}

/// Handle returned by `on_auth_state_change`
#[derive(Debug, Clone)]
pub struct AuthSubscription {
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<ListenerRegistry>,
}

impl AuthSubscription {
    pub(crate) fn new(id: u64, active: Arc<AtomicBool>, registry: &Arc<ListenerRegistry>) -> Self {
        Self {
            id,
            active,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop delivery, including events already queued. Idempotent.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.disconnect(self.id);
        }
        let id = self.id.to_string();
        log_event_with_fields(Event::AuthListenerRemoved, &[("listener", id.as_str())]);
    }
}
