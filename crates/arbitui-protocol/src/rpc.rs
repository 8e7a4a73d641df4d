//! JSON-RPC 2.0 envelope spoken to the pricing engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Engine methods in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Price a payoff (unused by the dashboard, part of the engine surface).
    Price,
    /// Sample implied vol and density for one cell.
    VolSampling,
    /// Check one cell for arbitrage.
    Arbitrage,
    /// Check every cell of a cube for arbitrage.
    ArbitrageMatrix,
}

impl Method {
    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Price => "price",
            Method::VolSampling => "vol-sampling",
            Method::Arbitrage => "arbitrage",
            Method::ArbitrageMatrix => "arbitrage-matrix",
        }
    }
}

fn jsonrpc_version() -> String {
    "2.0".to_owned()
}

/// One request record, written as a self-delimited line or POST body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Engine method.
    pub method: Method,
    /// Method parameters, already serialized.
    pub params: Value,
    /// Correlation identifier, unique per connection lifetime.
    pub id: String,
    /// Always `"2.0"`.
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
}

impl RpcRequest {
    /// Build a request with the given correlation id.
    pub fn new(method: Method, params: Value, id: impl Into<String>) -> Self {
        Self {
            method,
            params,
            id: id.into(),
            jsonrpc: jsonrpc_version(),
        }
    }
}

/// Structured error carried in a response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    /// Numeric JSON-RPC error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One response record.
///
/// Exactly one of `result`/`error` is expected to be present; a response
/// carrying neither is treated as malformed by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Result payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
    /// Echoed correlation identifier (absent on engine-level failures).
    #[serde(default)]
    pub id: Option<String>,
    /// Always `"2.0"`.
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
}

impl RpcResponse {
    /// Build a success response (used by test fakes).
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
            id: Some(id.into()),
            jsonrpc: jsonrpc_version(),
        }
    }

    /// Build an error response (used by test fakes).
    pub fn failure(id: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(RpcErrorBody {
                code,
                message: message.into(),
                data: None,
            }),
            id: Some(id.into()),
            jsonrpc: jsonrpc_version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_kebab_case_on_wire() {
        assert_eq!(
            serde_json::to_string(&Method::VolSampling).unwrap(),
            "\"vol-sampling\""
        );
        assert_eq!(
            serde_json::to_string(&Method::ArbitrageMatrix).unwrap(),
            "\"arbitrage-matrix\""
        );
        let m: Method = serde_json::from_str("\"arbitrage\"").unwrap();
        assert_eq!(m, Method::Arbitrage);
    }

    #[test]
    fn method_as_str_matches_serde() {
        for m in [
            Method::Price,
            Method::VolSampling,
            Method::Arbitrage,
            Method::ArbitrageMatrix,
        ] {
            let js = serde_json::to_value(m).unwrap();
            assert_eq!(js, json!(m.as_str()));
        }
    }

    #[test]
    fn request_carries_version() {
        let req = RpcRequest::new(Method::Arbitrage, json!({"x": 1}), "42");
        let js = serde_json::to_value(&req).unwrap();
        assert_eq!(js["jsonrpc"], "2.0");
        assert_eq!(js["id"], "42");
        assert_eq!(js["method"], "arbitrage");
    }

    #[test]
    fn response_success_and_error() {
        let ok = RpcResponse::success("1", json!({"arbitrage": null}));
        assert!(ok.result.is_some());
        assert!(ok.error.is_none());

        let err = RpcResponse::failure("2", -32000, "engine exploded");
        assert!(err.result.is_none());
        assert_eq!(err.error.as_ref().unwrap().code, -32000);
    }

    #[test]
    fn response_decodes_without_id() {
        let rsp: RpcResponse = serde_json::from_str(
            r#"{"error":{"code":-32700,"message":"parse error"},"jsonrpc":"2.0"}"#,
        )
        .unwrap();
        assert!(rsp.id.is_none());
        assert!(rsp.result.is_none());
    }

    #[test]
    fn response_decodes_with_neither_result_nor_error() {
        // Malformed by contract, but must still decode so the reader can
        // fail the matching call rather than the whole connection.
        let rsp: RpcResponse = serde_json::from_str(r#"{"id":"7","jsonrpc":"2.0"}"#).unwrap();
        assert!(rsp.result.is_none());
        assert!(rsp.error.is_none());
        assert_eq!(rsp.id.as_deref(), Some("7"));
    }
}
