//! JSON-RPC dispatcher
//!
//! Turns one request payload into exactly one response: parse, validate the
//! envelope, route the method, invoke the tool and shape the result. The
//! dispatcher keeps no state between requests.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::error::RpcError;
use crate::mcp::registry::ToolRegistry;
use crate::mcp::types::{
    Arguments, CallToolParams, JsonRpcRequest, JsonRpcResponse, ListToolsResult, RequestId,
    RpcMethod, JSONRPC_VERSION,
};

/// JSON-RPC dispatcher over an immutable tool registry
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a fully built registry
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Handle a raw request body
    pub async fn handle_bytes(&self, body: &[u8]) -> JsonRpcResponse {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => self.handle_value(payload).await,
            Err(e) => {
                tracing::debug!("Rejecting unparseable request: {}", e);
                JsonRpcResponse::error(
                    RequestId::Null,
                    RpcError::Parse {
                        detail: e.to_string(),
                    }
                    .into(),
                )
            }
        }
    }

    /// Handle an already parsed request payload
    pub async fn handle_value(&self, payload: Value) -> JsonRpcResponse {
        let request = match validate(payload) {
            Ok(request) => request,
            Err((id, err)) => return JsonRpcResponse::error(id, err.into()),
        };

        let id = request.id.clone();
        match self.route(request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::error(id, err.into()),
        }
    }

    async fn route(&self, request: JsonRpcRequest) -> Result<Value, RpcError> {
        let method = RpcMethod::parse(&request.method).ok_or_else(|| RpcError::MethodNotFound {
            method: request.method.clone(),
        })?;
        tracing::debug!("Dispatching {}", method.as_str());

        match method {
            RpcMethod::ListTools => self.list_tools(),
            RpcMethod::CallTool => {
                let params = call_tool_params(request.params.unwrap_or_default())?;
                self.call_tool(params).await
            }
        }
    }

    fn list_tools(&self) -> Result<Value, RpcError> {
        let result = ListToolsResult {
            tools: self.registry.list().to_vec(),
        };
        to_result(&result)
    }

    async fn call_tool(&self, params: CallToolParams) -> Result<Value, RpcError> {
        let CallToolParams { name, arguments } = params;
        let handler = self.registry.get(&name)?;
        let started = Instant::now();

        // Each call runs on its own task; a handler panic comes back as a JoinError.
        let outcome = tokio::spawn(async move { handler.call(arguments).await }).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Ok(result)) => {
                tracing::info!("Tool {} completed in {:?}", name, elapsed);
                to_result(&result)
            }
            Ok(Err(err)) => {
                let err = RpcError::from(err);
                match &err {
                    RpcError::UpstreamUnavailable { detail } => {
                        tracing::warn!("Tool {} upstream unavailable: {}", name, detail)
                    }
                    RpcError::Internal { detail } => {
                        tracing::error!("Tool {} failed: {}", name, detail)
                    }
                    _ => tracing::debug!("Tool {} rejected arguments: {}", name, err),
                }
                Err(err)
            }
            Err(join_err) => {
                tracing::error!("Tool {} aborted: {}", name, join_err);
                Err(RpcError::Internal {
                    detail: format!("tool '{}' aborted", name),
                })
            }
        }
    }
}

/// Check the envelope and pull out the request
///
/// On failure the best id recoverable from the payload is returned with the
/// error, falling back to null.
fn validate(payload: Value) -> Result<JsonRpcRequest, (RequestId, RpcError)> {
    let Value::Object(mut envelope) = payload else {
        return Err((
            RequestId::Null,
            RpcError::invalid_request("Request must be a JSON object"),
        ));
    };

    let id = match envelope.get("id") {
        None => RequestId::Null,
        Some(raw) => RequestId::from_value(raw).ok_or_else(|| {
            (
                RequestId::Null,
                RpcError::invalid_request("'id' must be a string, integer or null"),
            )
        })?,
    };

    if envelope.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err((id, RpcError::invalid_request("Invalid JSON-RPC version")));
    }

    let method = match envelope.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err((
                id,
                RpcError::invalid_request("'method' must be a string"),
            ))
        }
    };

    let params = match envelope.remove("params") {
        None | Some(Value::Null) => None,
        Some(Value::Object(params)) => Some(params),
        Some(_) => {
            return Err((id, RpcError::invalid_request("'params' must be an object")));
        }
    };

    Ok(JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id,
        method,
        params,
    })
}

fn call_tool_params(mut params: Map<String, Value>) -> Result<CallToolParams, RpcError> {
    let name = match params.remove("name") {
        Some(Value::String(name)) if !name.is_empty() => name,
        _ => return Err(RpcError::invalid_params("Missing 'name' in params")),
    };

    let arguments = match params.remove("arguments") {
        None | Some(Value::Null) => Arguments::new(),
        Some(Value::Object(arguments)) => arguments,
        Some(_) => return Err(RpcError::invalid_params("'arguments' must be an object")),
    };

    Ok(CallToolParams { name, arguments })
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Internal {
        detail: e.to_string(),
    })
}
