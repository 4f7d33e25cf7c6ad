//! Configuration management for the Manse MCP Server
//!
//! Handles bind address, database location, the upstream query timeout and
//! the solar-term table override, all read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default HTTP bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP bind port
pub const DEFAULT_PORT: u16 = 8000;

/// Default timeout for a single manse query
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5000;

/// Configuration for the Manse MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind host
    pub host: String,

    /// HTTP bind port
    pub port: u16,

    /// SQLite database read by `query_manse`
    pub manse_db_path: PathBuf,

    /// Upper bound on a single `query_manse` round trip
    pub query_timeout: Duration,

    /// Solar-term table override; the built-in table is used when unset
    pub solar_terms_path: Option<PathBuf>,
}

impl Config {
    /// Create a new configuration from the process environment
    pub fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MANSE_MCP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("MANSE_MCP_PORT") {
            Some(raw) => parse_var("MANSE_MCP_PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let manse_db_path = lookup("MANSE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_db_path);

        let timeout_ms = match lookup("MANSE_QUERY_TIMEOUT_MS") {
            Some(raw) => parse_var("MANSE_QUERY_TIMEOUT_MS", &raw)?,
            None => DEFAULT_QUERY_TIMEOUT_MS,
        };

        let solar_terms_path = lookup("SOLAR_TERMS_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            manse_db_path,
            query_timeout: Duration::from_millis(timeout_ms),
            solar_terms_path,
        })
    }

    /// Default database location under the user's home directory
    fn default_db_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".manse-mcp")
            .join("manse.db")
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}
