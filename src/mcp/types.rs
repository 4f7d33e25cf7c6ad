//! MCP protocol type definitions
//!
//! JSON-RPC envelopes and the tool descriptor/result types exchanged over the
//! `mcp.list_tools` and `mcp.call_tool` methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RpcError;

/// JSON-RPC version
pub const JSONRPC_VERSION: &str = "2.0";

/// Tool arguments as supplied by the caller
pub type Arguments = Map<String, Value>;

/// Request ID (string, integer or null)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    #[default]
    Null,
}

impl RequestId {
    /// Interpret a raw `id` member; `None` when it is not a legal id
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::Null => Some(Self::Null),
            _ => None,
        }
    }
}

/// Validated JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request ID
    #[serde(default)]
    pub id: RequestId,

    /// Method name
    pub method: String,

    /// Method parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

/// Outcome carried by a response; exactly one of `result` or `error`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ResponsePayload {
    #[serde(rename = "result")]
    Result(Value),

    #[serde(rename = "error")]
    Error(JsonRpcError),
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,

    /// Request ID, echoed from the request
    pub id: RequestId,

    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    /// Create an error response
    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Error(error),
        }
    }

    /// Result value, if this is a success response
    #[cfg(test)]
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    /// Error object, if this is an error response
    #[cfg(test)]
    pub fn error_object(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Error(error) => Some(error),
            ResponsePayload::Result(_) => None,
        }
    }
}

/// JSON-RPC error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Error message
    pub message: String,

    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RpcError> for JsonRpcError {
    fn from(err: RpcError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            data: err.data(),
        }
    }
}

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// Input schema (JSON Schema)
    pub input_schema: Value,
}

/// List tools result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Available tools, in registration order
    pub tools: Vec<ToolDescriptor>,
}

/// Call tool params
#[derive(Debug, Clone)]
pub struct CallToolParams {
    /// Tool name
    pub name: String,

    /// Tool arguments
    pub arguments: Arguments,
}

/// Tool output item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum OutputItem {
    /// Text content
    Text(String),

    /// Structured content
    Json(Value),
}

/// Call tool result; always holds at least one output
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolResult {
    outputs: Vec<OutputItem>,
}

impl ToolResult {
    /// Create a text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            outputs: vec![OutputItem::Text(text.into())],
        }
    }

    /// Create a structured result
    pub fn json(value: Value) -> Self {
        Self {
            outputs: vec![OutputItem::Json(value)],
        }
    }

    /// Outputs in order; never empty
    pub fn outputs(&self) -> &[OutputItem] {
        &self.outputs
    }
}

/// Supported JSON-RPC methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    ListTools,
    CallTool,
}

impl RpcMethod {
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            methods::LIST_TOOLS => Some(Self::ListTools),
            methods::CALL_TOOL => Some(Self::CallTool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListTools => methods::LIST_TOOLS,
            Self::CallTool => methods::CALL_TOOL,
        }
    }
}

/// MCP methods
pub mod methods {
    pub const LIST_TOOLS: &str = "mcp.list_tools";
    pub const CALL_TOOL: &str = "mcp.call_tool";
}
