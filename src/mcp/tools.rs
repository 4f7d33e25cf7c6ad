//! MCP Tool definitions and handlers
//!
//! Defines all available tools and their implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::calendar::{calc_daewoon, parse_yyyymmdd, SolarTermTable};
use crate::error::{RegistryError, ToolError};
use crate::manse::RowSource;
use crate::mcp::registry::{ToolHandler, ToolRegistry};
use crate::mcp::types::{Arguments, ToolDescriptor, ToolResult};

/// Rows returned by `query_manse` when no limit is given
pub const DEFAULT_QUERY_LIMIT: u64 = 10;

/// Largest `limit` accepted by `query_manse`
pub const MAX_QUERY_LIMIT: u64 = 100;

/// The closed set of tools this server offers, in listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    Echo,
    Uppercase,
    QueryManse,
    CalcDaewoon,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::Echo,
        ToolName::Uppercase,
        ToolName::QueryManse,
        ToolName::CalcDaewoon,
    ];

    /// Wire name of the tool
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::Uppercase => "uppercase",
            Self::QueryManse => "query_manse",
            Self::CalcDaewoon => "calc_daewoon",
        }
    }

    /// Inverse of `as_str`
    #[cfg(test)]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Echo => "Echo back the provided text",
            Self::Uppercase => "Return the text in uppercase",
            Self::QueryManse => "Fetch rows from the manse calendar database",
            Self::CalcDaewoon => {
                "Scaled day distances from a date to the surrounding solar terms"
            }
        }
    }

    fn input_schema(&self) -> Value {
        match self {
            Self::Echo | Self::Uppercase => text_schema(),
            Self::QueryManse => query_manse_schema(),
            Self::CalcDaewoon => calc_daewoon_schema(),
        }
    }

    /// Descriptor advertised by `mcp.list_tools`
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Collaborators the tools depend on
#[derive(Clone)]
pub struct ToolContext {
    /// Manse row source for `query_manse`
    pub rows: Arc<dyn RowSource>,

    /// Solar-term table for `calc_daewoon`
    pub terms: Arc<SolarTermTable>,

    /// Bound on a single `query_manse` fetch
    pub query_timeout: Duration,
}

/// Build the registry with every tool in [`ToolName::ALL`]
pub fn build_registry(ctx: ToolContext) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    for tool in ToolName::ALL {
        let descriptor = tool.descriptor();
        match tool {
            ToolName::Echo => registry.register(descriptor, EchoTool)?,
            ToolName::Uppercase => registry.register(descriptor, UppercaseTool)?,
            ToolName::QueryManse => registry.register(
                descriptor,
                QueryManseTool {
                    rows: Arc::clone(&ctx.rows),
                    timeout: ctx.query_timeout,
                },
            )?,
            ToolName::CalcDaewoon => registry.register(
                descriptor,
                CalcDaewoonTool {
                    terms: Arc::clone(&ctx.terms),
                },
            )?,
        }
    }

    Ok(registry)
}

// ==================== Tool Handlers ====================

/// `echo`: returns `text` unchanged
pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    async fn call(&self, arguments: Arguments) -> Result<ToolResult, ToolError> {
        let text = required_str(&arguments, "text")?;
        Ok(ToolResult::text(text))
    }
}

/// `uppercase`: returns `text` upper-cased
pub struct UppercaseTool;

#[async_trait]
impl ToolHandler for UppercaseTool {
    async fn call(&self, arguments: Arguments) -> Result<ToolResult, ToolError> {
        let text = required_str(&arguments, "text")?;
        Ok(ToolResult::text(text.to_uppercase()))
    }
}

/// `query_manse`: rows from the manse database
pub struct QueryManseTool {
    rows: Arc<dyn RowSource>,
    timeout: Duration,
}

#[async_trait]
impl ToolHandler for QueryManseTool {
    async fn call(&self, arguments: Arguments) -> Result<ToolResult, ToolError> {
        let limit = query_limit(&arguments)?;

        let rows = match tokio::time::timeout(self.timeout, self.rows.fetch_rows(limit)).await {
            Ok(rows) => rows?,
            Err(_) => {
                return Err(ToolError::UpstreamUnavailable {
                    message: format!("manse query timed out after {:?}", self.timeout),
                })
            }
        };

        let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
        Ok(ToolResult::json(Value::Array(rows)))
    }
}

/// `calc_daewoon`: distances to the surrounding solar terms
pub struct CalcDaewoonTool {
    terms: Arc<SolarTermTable>,
}

#[async_trait]
impl ToolHandler for CalcDaewoonTool {
    async fn call(&self, arguments: Arguments) -> Result<ToolResult, ToolError> {
        let raw = required_str(&arguments, "yyyymmdd")?;
        let date = parse_yyyymmdd(raw).map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let diff = calc_daewoon(&self.terms, date);
        let value = serde_json::to_value(diff).map_err(|e| ToolError::Internal {
            message: e.to_string(),
        })?;
        Ok(ToolResult::json(value))
    }
}

// ==================== Argument Helpers ====================

fn required_str<'a>(arguments: &'a Arguments, field: &str) -> Result<&'a str, ToolError> {
    match arguments.get(field) {
        None | Some(Value::Null) => Err(ToolError::invalid_arguments(format!(
            "'{}' field required",
            field
        ))),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "'{}' must be a string",
            field
        ))),
    }
}

fn query_limit(arguments: &Arguments) -> Result<usize, ToolError> {
    let limit = match arguments.get("limit") {
        None | Some(Value::Null) => DEFAULT_QUERY_LIMIT,
        Some(value) => value
            .as_u64()
            .filter(|&n| n <= MAX_QUERY_LIMIT)
            .ok_or_else(|| {
                ToolError::invalid_arguments(format!(
                    "'limit' must be an integer between 0 and {}",
                    MAX_QUERY_LIMIT
                ))
            })?,
    };

    // Bounded by MAX_QUERY_LIMIT, fits any usize.
    Ok(limit as usize)
}

// ==================== Tool Schemas ====================

fn text_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": {"type": "string"}
        },
        "required": ["text"]
    })
}

fn query_manse_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "integer",
                "minimum": 0,
                "maximum": MAX_QUERY_LIMIT,
                "default": DEFAULT_QUERY_LIMIT,
                "description": "Maximum number of rows to return"
            }
        }
    })
}

fn calc_daewoon_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "yyyymmdd": {
                "type": "string",
                "pattern": "^[0-9]{8}$",
                "description": "Date as YYYYMMDD"
            }
        },
        "required": ["yyyymmdd"]
    })
}
