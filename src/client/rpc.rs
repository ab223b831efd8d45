//! Remote procedure placeholder
//!
//! No procedure is implemented. A call resolves after the artificial
//! latency to empty data, or to an `unimplemented` error in strict mode.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ClientError, ErrorDescriptor};
use crate::observability::{log_event_with_fields, Event};

/// `{data, error}` returned by an rpc call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RpcResponse {
    pub data: Option<Value>,
    pub error: Option<ErrorDescriptor>,
}

/// A pending rpc call; resolves when awaited
#[derive(Debug, Clone)]
pub struct RpcCall {
    name: String,
    params: Value,
    latency: Duration,
    strict: bool,
}

impl RpcCall {
    pub(crate) fn new(name: impl Into<String>, params: Value, latency: Duration, strict: bool) -> Self {
        Self {
            name: name.into(),
            params,
            latency,
            strict,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    pub async fn execute(self) -> RpcResponse {
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }

        log_event_with_fields(Event::RpcCalled, &[("function", self.name.as_str())]);

        if self.strict {
            RpcResponse {
                data: None,
                error: Some(ClientError::Unimplemented(self.name).into()),
            }
        } else {
            RpcResponse::default()
        }
    }
}

impl IntoFuture for RpcCall {
    type Output = RpcResponse;
    type IntoFuture = Pin<Box<dyn Future<Output = RpcResponse> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_lenient_call_resolves_empty() {
        let response = RpcCall::new("increment_views", json!({"post_id": "1"}), Duration::ZERO, false).await;
        assert_eq!(response, RpcResponse::default());
    }

    #[tokio::test]
    async fn test_strict_call_is_unimplemented() {
        let response = RpcCall::new("increment_views", Value::Null, Duration::ZERO, true).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::Unimplemented);
        assert!(error.message.contains("increment_views"));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_call_waits_for_latency() {
        let start = std::time::Instant::now();
        RpcCall::new("f", Value::Null, Duration::from_millis(30), false).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
