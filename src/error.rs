//! Error types for the Manse MCP Server
//!
//! This module defines the error hierarchy for all operations in the server,
//! including the JSON-RPC error taxonomy surfaced to callers.

use serde_json::{json, Value};
use thiserror::Error;

/// Main error type for the Manse MCP Server
#[derive(Error, Debug)]
pub enum ManseMcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Tool invocation errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Solar-term calendar errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Manse store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

/// Tool registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {name}")]
    DuplicateTool { name: String },

    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },
}

/// Errors raised by a tool handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{message}")]
    InvalidArguments { message: String },

    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Internal tool failure: {message}")]
    Internal { message: String },
}

impl ToolError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }
}

/// Solar-term table and date errors
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid date {input:?}: expected YYYYMMDD")]
    InvalidDate { input: String },

    #[error("Solar-term table is empty")]
    EmptyTable,

    #[error("Solar-term table is not ordered by date at entry {index} ({date})")]
    UnorderedTable { index: usize, date: chrono::NaiveDate },

    #[error("Solar-term ordinal {ordinal} out of range 1..=24 at entry {index}")]
    InvalidOrdinal { index: usize, ordinal: u8 },

    #[error("Failed to read solar-term table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed solar-term table: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Manse store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database unavailable at {path}: {message}")]
    Unavailable { path: String, message: String },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Task(_) => ToolError::Internal {
                message: err.to_string(),
            },
            StoreError::Unavailable { .. } | StoreError::Query(_) => {
                ToolError::UpstreamUnavailable {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// REST echo adapter errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestError {
    #[error("`inputs` field is required")]
    MissingInputs,

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

/// JSON-RPC level errors
///
/// `message` is always a short fixed or caller-derived string. Diagnostic
/// detail from inside the server only ever travels in `data`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("Parse error")]
    Parse { detail: String },

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("{message}")]
    InvalidParams { message: String },

    #[error("Tool not found")]
    ToolNotFound { name: String },

    #[error("Upstream unavailable")]
    UpstreamUnavailable { detail: String },

    #[error("Internal error")]
    Internal { detail: String },
}

/// JSON-RPC error codes
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const TOOL_NOT_FOUND: i32 = -32001;
    pub const UPSTREAM_UNAVAILABLE: i32 = -32002;
}

impl RpcError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Numeric JSON-RPC error code
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse { .. } => codes::PARSE_ERROR,
            Self::InvalidRequest { .. } => codes::INVALID_REQUEST,
            Self::MethodNotFound { .. } => codes::METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => codes::INVALID_PARAMS,
            Self::ToolNotFound { .. } => codes::TOOL_NOT_FOUND,
            Self::UpstreamUnavailable { .. } => codes::UPSTREAM_UNAVAILABLE,
            Self::Internal { .. } => codes::INTERNAL_ERROR,
        }
    }

    /// Optional `data` member of the error object
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::Parse { detail }
            | Self::UpstreamUnavailable { detail }
            | Self::Internal { detail } => Some(Value::String(detail.clone())),
            Self::ToolNotFound { name } => Some(json!({ "name": name })),
            Self::InvalidRequest { .. }
            | Self::MethodNotFound { .. }
            | Self::InvalidParams { .. } => None,
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArguments { message } => RpcError::InvalidParams { message },
            ToolError::UpstreamUnavailable { message } => {
                RpcError::UpstreamUnavailable { detail: message }
            }
            ToolError::Internal { message } => RpcError::Internal { detail: message },
        }
    }
}

impl From<RegistryError> for RpcError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ToolNotFound { name } => RpcError::ToolNotFound { name },
            RegistryError::DuplicateTool { .. } => RpcError::Internal {
                detail: err.to_string(),
            },
        }
    }
}

/// Result type alias for Manse MCP operations
pub type Result<T> = std::result::Result<T, ManseMcpError>;
