//! MCP (Model Context Protocol) module
//!
//! Implements the list/call subset of the protocol for tool invocation.

pub mod dispatcher;
pub mod registry;
pub mod rest;
pub mod server;
pub mod tools;
pub mod types;
