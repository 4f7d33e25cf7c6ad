//! Manse MCP Server Library
//!
//! A small Model Context Protocol style server exposing named tools over a
//! REST echo endpoint and a JSON-RPC 2.0 endpoint. Besides the text tools it
//! ships a solar-term calculator (`calc_daewoon`) and a manse database query
//! (`query_manse`).

pub mod calendar;
pub mod config;
pub mod error;
pub mod manse;
pub mod mcp;

pub use config::Config;
pub use error::{ManseMcpError, Result};
