use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::RpcMethod;
use crate::error::ClientError;
use crate::sse::{StreamEvent, StreamPayload};

pub const JSONRPC_VERSION: &str = "2.0";

/// Outbound JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: RpcMethod,
    pub params: Value,
}

impl RpcRequest {
    /// Build a request with a fresh v4 UUID id.
    pub fn new(method: RpcMethod, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method,
            params,
        }
    }

    pub fn to_json(&self) -> Result<String, ClientError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl From<RpcErrorObject> for ClientError {
    fn from(err: RpcErrorObject) -> Self {
        ClientError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

/// Decode a single-shot response body into the payload it carries.
///
/// A JSON-RPC error object fails the call. A body that is not JSON passes
/// through as a raw payload, the same fallback the stream parser applies.
pub fn decode_response(body: &str) -> Result<StreamPayload, ClientError> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => return Ok(StreamPayload::Raw(body.to_string())),
    };
    if let Some(error) = value.get("error").filter(|e| e.is_object()) {
        let error: RpcErrorObject = serde_json::from_value(error.clone())?;
        return Err(error.into());
    }
    Ok(StreamPayload::Event(StreamEvent::from_value(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::A2aEvent;

    #[test]
    fn test_request_serialization() {
        let request = RpcRequest::new(RpcMethod::GetTask, serde_json::json!({"id": "t-1"}));
        let json: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "GetTask");
        assert_eq!(json["params"]["id"], "t-1");
        assert!(Uuid::parse_str(json["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = RpcRequest::new(RpcMethod::ListTasks, serde_json::json!({}));
        let b = RpcRequest::new(RpcMethod::ListTasks, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_decode_result_task() {
        let body = r#"{"jsonrpc":"2.0","id":"1","result":{"task":{"id":"t-1","contextId":"c-1","status":{"state":"completed"}}}}"#;
        let payload = decode_response(body).unwrap();
        match payload.as_event() {
            Some(A2aEvent::Task(task)) => {
                assert_eq!(task.id, "t-1");
                assert_eq!(task.state(), Some("completed"));
            }
            other => panic!("Expected Task, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_object() {
        let body = r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32001,"message":"Task not found"}}"#;
        assert_eq!(
            decode_response(body),
            Err(ClientError::Rpc {
                code: -32001,
                message: "Task not found".to_string()
            })
        );
    }

    #[test]
    fn test_decode_non_json_is_raw() {
        assert_eq!(
            decode_response("OK").unwrap(),
            StreamPayload::Raw("OK".to_string())
        );
    }
}
