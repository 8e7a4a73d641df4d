//! Engine client over per-call HTTP POSTs.
//!
//! Same admission ceiling, deadline, and error taxonomy as the stream
//! transport; correlation is trivial because each call owns its request.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::warn;
use uuid::Uuid;

use arbitui_protocol::{Method, RpcRequest, RpcResponse};

use crate::client::EngineClient;
use crate::errors::RpcError;
use crate::stream::ClientConfig;

/// Engine client that POSTs each call to an RPC endpoint.
pub struct HttpClient {
    http: reqwest::Client,
    url: String,
    sem: Semaphore,
    call_timeout: std::time::Duration,
}

impl HttpClient {
    /// Build a client for the given RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            sem: Semaphore::new(config.max_in_flight),
            call_timeout: config.call_timeout,
        }
    }

    fn map_transport_error(err: reqwest::Error) -> RpcError {
        if err.is_decode() {
            RpcError::decode(err)
        } else {
            RpcError::ConnectionLost
        }
    }
}

#[async_trait]
impl EngineClient for HttpClient {
    async fn call(&self, method: Method, params: Value) -> Result<Value, RpcError> {
        let _permit = self
            .sem
            .acquire()
            .await
            .map_err(|_| RpcError::ConnectionLost)?;

        let id = Uuid::new_v4().to_string();
        let request = RpcRequest::new(method, params, &id);

        let exchange = async {
            let rsp = self
                .http
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(Self::map_transport_error)?;
            let rsp = rsp
                .error_for_status()
                .map_err(Self::map_transport_error)?;
            rsp.json::<RpcResponse>()
                .await
                .map_err(Self::map_transport_error)
        };

        let rsp = tokio::time::timeout(self.call_timeout, exchange)
            .await
            .map_err(|_| RpcError::Timeout)??;

        if rsp.id.as_deref().is_some_and(|echoed| echoed != id) {
            warn!(sent = id, got = ?rsp.id, "engine echoed a different correlation id");
        }

        match (rsp.result, rsp.error) {
            (_, Some(err)) => Err(RpcError::Remote {
                code: err.code,
                message: err.message,
            }),
            (Some(value), None) => Ok(value),
            (None, None) => Err(RpcError::Decode(
                "response carries neither result nor error".into(),
            )),
        }
    }
}
