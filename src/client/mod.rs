//! # Client
//!
//! The single context object handed to consumers. Construct it once and
//! clone it freely; clones share the fixture store and the auth session.

mod config;
mod rpc;

use std::sync::Arc;

use serde_json::Value;

use crate::auth::AuthEmulator;
use crate::fixtures::FixtureStore;
use crate::observability::{log_event_with_fields, Event};
use crate::query::QueryBuilder;

pub use config::{ClientConfig, ConfigError};
pub use rpc::{RpcCall, RpcResponse};

/// Facade over the query builder, auth emulator and rpc placeholder
#[derive(Debug, Clone)]
pub struct Client {
    store: Arc<FixtureStore>,
    auth: Arc<AuthEmulator>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Client over freshly seeded demo data
    pub fn new(config: ClientConfig) -> Self {
        Self::with_store(Arc::new(FixtureStore::seeded()), config)
    }

    /// Client over an existing store.
    ///
    /// If `initial_user` names no account in `store`, the client starts
    /// anonymous.
    pub fn with_store(store: Arc<FixtureStore>, config: ClientConfig) -> Self {
        let auth = AuthEmulator::new(Arc::clone(&store), config.auth_config());

        if let Some(email) = &config.initial_user {
            if let Err(e) = auth.sign_in_as(email) {
                let reason = e.to_string();
                log_event_with_fields(Event::AuthSignInFailed, &[("reason", reason.as_str())]);
            }
        }

        Self {
            store,
            auth: Arc::new(auth),
            config: Arc::new(config),
        }
    }

    /// A fresh request against `name`
    pub fn table(&self, name: &str) -> QueryBuilder {
        QueryBuilder::new(Arc::clone(&self.store), name, self.config.latency())
    }

    /// The shared auth emulator
    pub fn auth(&self) -> &AuthEmulator {
        &self.auth
    }

    /// Invoke a remote procedure (placeholder)
    pub fn rpc(&self, name: &str, params: impl Into<Value>) -> RpcCall {
        RpcCall::new(name, params.into(), self.config.latency(), self.config.rpc_strict)
    }

    pub fn store(&self) -> &Arc<FixtureStore> {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::errors::ErrorCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_table_reads_store() {
        let client = Client::new(ClientConfig::instant());
        let envelope = client.table("profiles").eq("id", "user2").single().await;
        assert_eq!(envelope.row().unwrap()["username"], json!("tech_fan"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let client = Client::new(ClientConfig::instant());
        let other = client.clone();

        other
            .table("comments")
            .insert(json!({"post_id": "1", "user_id": "1", "content": "Shared"}))
            .await;
        let envelope = client.table("comments").eq("post_id", "1").await;
        assert_eq!(envelope.count, 3);
    }

    #[tokio::test]
    async fn test_demo_starts_signed_in() {
        let client = Client::new(ClientConfig {
            latency_ms: 0,
            ..ClientConfig::demo()
        });
        assert_eq!(client.auth().state(), AuthState::Authenticated);
        let user = client.auth().get_user().await.data.user.unwrap();
        assert_eq!(user.email, "zhangsan@example.com");
    }

    #[tokio::test]
    async fn test_unknown_initial_user_starts_anonymous() {
        let config = ClientConfig {
            initial_user: Some("ghost@example.com".to_string()),
            ..ClientConfig::instant()
        };
        let client = Client::new(config);
        assert_eq!(client.auth().state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_rpc_modes() {
        let lenient = Client::new(ClientConfig::instant());
        assert_eq!(lenient.rpc("f", json!({})).await, RpcResponse::default());

        let strict = Client::new(ClientConfig {
            rpc_strict: true,
            ..ClientConfig::instant()
        });
        let response = strict.rpc("f", Value::Null).await;
        assert_eq!(response.error.unwrap().code, ErrorCode::Unimplemented);
    }

    #[test]
    fn test_table_names_builder() {
        let client = Client::new(ClientConfig::instant());
        assert_eq!(client.table("posts").table_name(), "posts");
    }
}
