//! MCP Server implementation
//!
//! Wires the dispatcher and the REST echo adapter to an HTTP listener, and
//! offers the same JSON-RPC surface over line-delimited stdio.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tower_http::trace::TraceLayer;

use crate::error::{RestError, Result};
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::rest::{self, RestRequest};

/// MCP Server info
const SERVER_NAME: &str = "manse-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the manse tools
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// HTTP routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/mcp", get(usage_handler).post(rest_handler))
            .route("/mcp/", get(usage_handler).post(rest_handler))
            .route("/mcp/rpc", post(rpc_handler))
            .with_state(Arc::clone(&self.dispatcher))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve HTTP until Ctrl-C
    pub async fn run_http(&self, bind_addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!(
            "{} {} listening on http://{}",
            SERVER_NAME,
            SERVER_VERSION,
            listener.local_addr()?
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        tracing::info!("{} {} serving JSON-RPC on stdio", SERVER_NAME, SERVER_VERSION);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve_lines(stdin, stdout).await
    }

    /// Answer one JSON-RPC request per input line
    pub async fn serve_lines<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = self.dispatcher.handle_bytes(line.as_bytes()).await;
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }

        Ok(())
    }
}

// ==================== HTTP Handlers ====================

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "Manse MCP Server is running" }))
}

async fn usage_handler() -> Json<serde_json::Value> {
    Json(rest::usage())
}

async fn rest_handler(payload: std::result::Result<Json<RestRequest>, JsonRejection>) -> Response {
    let result = match payload {
        Ok(Json(request)) => rest::echo(request),
        Err(rejection) => Err(RestError::InvalidBody {
            message: rejection.body_text(),
        }),
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": err.to_string() })),
        )
            .into_response(),
    }
}

/// JSON-RPC endpoint; protocol errors travel in the body with HTTP 200
async fn rpc_handler(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> Response {
    Json(dispatcher.handle_bytes(&body).await).into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
