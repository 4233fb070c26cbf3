//! JSON-RPC 2.0 wire envelopes
//!
//! The appliance speaks JSON-RPC 2.0 over a persistent WebSocket. Requests
//! and responses are single text frames; correlation is by integer id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing request envelope
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> Request<'a> {
    pub fn new(method: &'a str, id: u64, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            id,
            params,
        }
    }
}

/// Incoming response envelope
///
/// Exactly one of `result` / `error` is present in a well-formed response;
/// both optional here so malformed frames surface as protocol errors
/// instead of deserialization noise.
#[derive(Debug, Deserialize)]
pub struct Response {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcErrorBody>,
}

/// Appliance-reported error object
#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_with_params() {
        let req = Request::new("auth.login_with_api_key", 1, Some(json!(["key"])));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "auth.login_with_api_key", "id": 1, "params": ["key"]})
        );
    }

    #[test]
    fn test_request_omits_absent_params() {
        let req = Request::new("core.ping", 7, None);
        let text = serde_json::to_string(&req).unwrap();
        assert!(!text.contains("params"));
    }

    #[test]
    fn test_response_with_error() {
        let resp: Response =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"nope"}}"#)
                .unwrap();
        assert_eq!(resp.id, Some(3));
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn test_response_with_result() {
        let resp: Response =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":true}"#).unwrap();
        assert_eq!(resp.result, Some(json!(true)));
        assert!(resp.error.is_none());
    }
}
