//! Auth Emulator Tests
//!
//! Session state machine and change notifications through the client:
//! - Sign-up then sign-in yields the same user
//! - Failed calls leave the session untouched
//! - Listeners see the current state first, then every transition in order
//! - Unsubscribed listeners see nothing further

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockbase::auth::{AuthEvent, AuthEventKind, AuthState, Credentials, SignUpRequest};
use mockbase::{Client, ClientConfig, ErrorCode};

// =============================================================================
// Helper Functions
// =============================================================================

fn client() -> Client {
    Client::new(ClientConfig::instant())
}

type Recorded = Arc<Mutex<Vec<AuthEvent>>>;

fn record(client: &Client) -> (Recorded, mockbase::auth::AuthSubscription) {
    let events: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = client
        .auth()
        .on_auth_state_change(move |event| sink.lock().unwrap().push(event));
    (events, subscription)
}

fn kinds(events: &Recorded) -> Vec<AuthEventKind> {
    events.lock().unwrap().iter().map(|e| e.kind).collect()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

// =============================================================================
// Credential Tests
// =============================================================================

#[tokio::test]
async fn test_sign_up_then_sign_in_round_trip() {
    let client = client();
    let auth = client.auth();

    let signed_up = auth
        .sign_up(SignUpRequest::new("reader@example.com", "s3cret"))
        .await;
    assert!(signed_up.is_ok());
    let user_id = signed_up.data.user.unwrap().id;

    auth.sign_out().await;
    assert_eq!(auth.state(), AuthState::Anonymous);

    let signed_in = auth
        .sign_in_with_password(Credentials::new("reader@example.com", "s3cret"))
        .await;
    assert!(signed_in.is_ok());

    let session = auth.get_session().await.data.session.unwrap();
    assert_eq!(session.user.id, user_id);
    assert_eq!(session.user.display_name, "reader");
    assert!(!session.access_token.is_empty());
}

#[tokio::test]
async fn test_credentials_are_exact() {
    let client = client();
    let auth = client.auth();

    for (email, password) in [
        ("zhangsan@example.com", "Password"),
        ("ZHANGSAN@example.com", "password"),
        ("zhangsan@example.com ", "password"),
        ("", ""),
    ] {
        let envelope = auth
            .sign_in_with_password(Credentials::new(email, password))
            .await;
        assert_eq!(envelope.error.unwrap().code, ErrorCode::InvalidCredentials);
    }

    assert_eq!(auth.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn test_duplicate_sign_up_keeps_session() {
    let client = client();
    let auth = client.auth();

    auth.sign_in_with_password(Credentials::new("wangwu@example.com", "password"))
        .await;
    let envelope = auth
        .sign_up(SignUpRequest::new("wangwu@example.com", "other"))
        .await;

    assert_eq!(envelope.error.unwrap().code, ErrorCode::DuplicateAccount);
    assert_eq!(auth.get_user().await.data.user.unwrap().id, "3");
}

/// The admin editor stamps new posts with the signed-in user's id.
#[tokio::test]
async fn test_get_user_for_authoring() {
    let client = client();
    client
        .auth()
        .sign_in_with_password(Credentials::new("zhaoliu@example.com", "password"))
        .await;

    let user = client.auth().get_user().await.data.user.unwrap();
    let envelope = client
        .table("posts")
        .insert(serde_json::json!({"title": "New", "status": "draft", "author_id": user.id}))
        .select("*, profiles(username)")
        .single()
        .await;

    assert_eq!(envelope.row().unwrap()["profiles"]["username"], "Zhao Liu");
}

// =============================================================================
// Listener Tests
// =============================================================================

#[tokio::test]
async fn test_initial_event_then_transitions_in_order() {
    let client = client();
    let (events, _subscription) = record(&client);

    let auth = client.auth();
    auth.sign_in_with_password(Credentials::new("lisi@example.com", "password"))
        .await;
    auth.sign_out().await;
    auth.sign_up(SignUpRequest::new("fresh@example.com", "pw")).await;
    settle().await;

    assert_eq!(
        kinds(&events),
        vec![
            AuthEventKind::SignedOut,
            AuthEventKind::SignedIn,
            AuthEventKind::SignedOut,
            AuthEventKind::SignedIn,
        ]
    );

    let recorded = events.lock().unwrap();
    assert_eq!(recorded[1].session.as_ref().unwrap().user.id, "2");
    assert!(recorded[2].session.is_none());
}

#[tokio::test]
async fn test_one_signed_out_per_sign_out_call() {
    let client = client();
    let (events, _subscription) = record(&client);

    client.auth().sign_out().await;
    client.auth().sign_out().await;
    settle().await;

    // initial state + two calls
    assert_eq!(kinds(&events), vec![AuthEventKind::SignedOut; 3]);
}

#[tokio::test]
async fn test_failed_sign_in_emits_nothing() {
    let client = client();
    let (events, _subscription) = record(&client);

    client
        .auth()
        .sign_in_with_password(Credentials::new("lisi@example.com", "bad"))
        .await;
    settle().await;

    assert_eq!(kinds(&events), vec![AuthEventKind::SignedOut]);
}

#[tokio::test]
async fn test_initial_event_waits_for_listener_delay() {
    let client = Client::new(ClientConfig {
        latency_ms: 0,
        listener_delay_ms: 80,
        ..ClientConfig::demo()
    });
    let (events, _subscription) = record(&client);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(events.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(kinds(&events), vec![AuthEventKind::SignedIn]);
}

#[tokio::test]
async fn test_listeners_are_independent() {
    let client = client();
    let (first, first_subscription) = record(&client);
    let (second, _second_subscription) = record(&client);
    settle().await;

    first_subscription.unsubscribe();
    client.auth().sign_out().await;
    settle().await;

    assert_eq!(kinds(&first), vec![AuthEventKind::SignedOut]);
    assert_eq!(kinds(&second), vec![AuthEventKind::SignedOut; 2]);
    assert_eq!(client.auth().listener_count(), 1);
}

#[tokio::test]
async fn test_unsubscribe_before_initial_event() {
    let client = Client::new(ClientConfig {
        listener_delay_ms: 50,
        ..ClientConfig::instant()
    });
    let (events, subscription) = record(&client);

    subscription.unsubscribe();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(events.lock().unwrap().is_empty());
    assert!(!subscription.is_active());
}
