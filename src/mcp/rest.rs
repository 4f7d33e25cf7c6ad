//! REST echo adapter
//!
//! The single-shot `POST /mcp` endpoint. It mirrors its input back as text
//! output and never touches the tool registry.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::RestError;
use crate::mcp::types::OutputItem;

/// Incoming REST request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestRequest {
    /// Model identifier
    #[serde(default)]
    pub model: Option<String>,

    /// Arbitrary input payload (required)
    #[serde(default)]
    pub inputs: Option<Value>,

    /// Processing instructions
    #[serde(default)]
    pub instructions: Option<String>,

    /// Additional metadata
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Outcome of a REST echo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestStatus {
    Ok,
    Error,
}

/// REST response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestResponse {
    /// Synthesized run id (UUID v4)
    pub id: String,

    pub status: RestStatus,

    /// Model identifier, echoed from the request
    pub model: Option<String>,

    pub outputs: Vec<OutputItem>,
}

/// Echo a REST request back as a response
pub fn echo(request: RestRequest) -> Result<RestResponse, RestError> {
    let inputs = match request.inputs {
        None | Some(Value::Null) => return Err(RestError::MissingInputs),
        Some(inputs) => inputs,
    };

    let (status, content) = match &inputs {
        Value::Object(map) => (RestStatus::Ok, derive_text(map)),
        _ => (
            RestStatus::Error,
            "`inputs` must be an object".to_string(),
        ),
    };

    let id = Uuid::new_v4().to_string();
    tracing::info!(
        "Processed REST echo id={} model={:?} status={:?}",
        id,
        request.model,
        status
    );

    Ok(RestResponse {
        id,
        status,
        model: request.model,
        outputs: vec![OutputItem::Text(content)],
    })
}

/// `text` when present, otherwise the whole input rendered as JSON
fn derive_text(inputs: &Map<String, Value>) -> String {
    match inputs.get("text") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => Value::Object(inputs.clone()).to_string(),
    }
}

/// Usage document served on `GET /mcp`
pub fn usage() -> Value {
    json!({
        "detail": "Use POST /mcp with JSON body. Example: {\"inputs\": {\"text\": \"hello\"}}",
        "allowed_methods": ["POST"],
        "rpc": {
            "endpoint": "POST /mcp/rpc",
            "methods": ["mcp.list_tools", "mcp.call_tool"]
        },
        "schema": {
            "request": {
                "model": "string?",
                "inputs": "object (required)",
                "instructions": "string?",
                "metadata": "object?"
            },
            "response": {
                "id": "uuid",
                "status": "ok|error",
                "model": "string?",
                "outputs": [
                    {"type": "text", "content": "string"}
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(inputs: Value) -> RestRequest {
        RestRequest {
            inputs: Some(inputs),
            model: Some("gpt-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_echo_text() {
        let resp = echo(request(json!({"text": "hello"}))).unwrap();
        assert_eq!(resp.status, RestStatus::Ok);
        assert_eq!(resp.model.as_deref(), Some("gpt-test"));
        assert_eq!(resp.outputs, vec![OutputItem::Text("hello".to_string())]);
        assert!(Uuid::parse_str(&resp.id).is_ok());
    }

    #[test]
    fn test_echo_without_text_key() {
        let resp = echo(request(json!({"a": 1}))).unwrap();
        assert_eq!(resp.outputs, vec![OutputItem::Text(r#"{"a":1}"#.to_string())]);

        let resp = echo(request(json!({"text": 12}))).unwrap();
        assert_eq!(resp.outputs, vec![OutputItem::Text("12".to_string())]);
    }

    #[test]
    fn test_non_object_inputs() {
        let resp = echo(request(json!("just a string"))).unwrap();
        assert_eq!(resp.status, RestStatus::Error);
        assert_eq!(resp.outputs.len(), 1);
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(echo(RestRequest::default()).unwrap_err(), RestError::MissingInputs);
        assert_eq!(echo(request(Value::Null)).unwrap_err(), RestError::MissingInputs);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = echo(request(json!({"text": "x"}))).unwrap();
        let b = echo(request(json!({"text": "x"}))).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(RestStatus::Ok).unwrap(), json!("ok"));
        assert_eq!(serde_json::to_value(RestStatus::Error).unwrap(), json!("error"));
    }
}
