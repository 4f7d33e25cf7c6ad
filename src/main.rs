//! Manse MCP Server - Rust Implementation
//!
//! Serves the echo, uppercase, query_manse and calc_daewoon tools over HTTP
//! (REST echo + JSON-RPC) or stdio.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use manse_mcp_server::calendar::{calc_daewoon, load_terms, parse_yyyymmdd};
use manse_mcp_server::config::Config;
use manse_mcp_server::error::Result;
use manse_mcp_server::manse::SqliteManseStore;
use manse_mcp_server::mcp::dispatcher::Dispatcher;
use manse_mcp_server::mcp::server::McpServer;
use manse_mcp_server::mcp::tools::{build_registry, ToolContext};

/// Manse MCP Server
#[derive(Parser)]
#[command(name = "manse-mcp-server")]
#[command(author, version, about = "Manse MCP Server - tool invocation over REST and JSON-RPC")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP (default)
    Serve {
        /// Bind host, overrides MANSE_MCP_HOST
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides MANSE_MCP_PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Serve JSON-RPC over stdin/stdout
    Stdio,

    /// Print the daewoon day differences for a YYYYMMDD date
    Calc {
        yyyymmdd: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::new()?;

    match cli.command {
        None => run_server(config).await?,
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config).await?;
        }
        Some(Commands::Stdio) => {
            let server = McpServer::new(build_dispatcher(&config)?);
            server.run_stdio().await?;
        }
        Some(Commands::Calc { yyyymmdd }) => {
            let terms = load_terms(config.solar_terms_path.as_deref())?;
            let date = parse_yyyymmdd(&yyyymmdd)?;
            let diff = calc_daewoon(&terms, date);
            println!("{}", serde_json::to_string_pretty(&diff)?);
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let server = McpServer::new(build_dispatcher(&config)?);
    server.run_http(&config.bind_addr()).await
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let terms = load_terms(config.solar_terms_path.as_deref())?;
    let store = SqliteManseStore::new(&config.manse_db_path);
    tracing::info!("Manse database: {}", store.path().display());

    let registry = build_registry(ToolContext {
        rows: Arc::new(store),
        terms: Arc::new(terms),
        query_timeout: config.query_timeout,
    })?;
    tracing::info!("Registered {} tools", registry.len());

    Ok(Dispatcher::new(Arc::new(registry)))
}
