//! JSON-RPC wire shapes (spec §6 "Wire protocol").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound request: `{"id": <int>, "method": <name>, "params": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    #[must_use]
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

/// Inbound reply: either `{"id", "result"}` or `{"id", "error"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub id: u64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorPayload>,
}

/// Error payload shape used by the exchange's JSON-RPC error responses.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorPayload {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_params_array() {
        let req = RpcRequest::new(7, "get_order_book", vec![Value::from("1.3.0"), Value::from("1.3.113")]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["method"], "get_order_book");
        assert!(json["params"].is_array());
    }

    #[test]
    fn response_with_result_parses() {
        let raw = r#"{"id": 1, "result": [1,2,3]}"#;
        let resp: RpcResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.id, 1);
        assert!(resp.result.is_some());
        assert!(resp.error.is_none());
    }

    #[test]
    fn response_with_error_parses() {
        let raw = r#"{"id": 2, "error": {"message": "not authorized"}}"#;
        let resp: RpcResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.id, 2);
        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap().message, "not authorized");
    }
}
