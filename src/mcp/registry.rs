//! Tool registry
//!
//! Holds the invocable tools in registration order. The registry is filled
//! once at startup and shared read-only afterwards, so lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RegistryError, ToolError};
use crate::mcp::types::{Arguments, ToolDescriptor, ToolResult};

/// A tool implementation: validate arguments, produce outputs
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Arguments) -> Result<ToolResult, ToolError>;
}

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    /// Descriptors in registration order (for `mcp.list_tools`)
    descriptors: Vec<ToolDescriptor>,

    /// Handlers, index-aligned with `descriptors`
    handlers: Vec<Arc<dyn ToolHandler>>,

    /// Tool name to position
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names must be unique
    pub fn register<H>(&mut self, descriptor: ToolDescriptor, handler: H) -> Result<(), RegistryError>
    where
        H: ToolHandler + 'static,
    {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool {
                name: descriptor.name,
            });
        }

        tracing::debug!("Registered tool {}", descriptor.name);
        self.index.insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        self.handlers.push(Arc::new(handler));
        Ok(())
    }

    /// All tool descriptors in registration order
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Look up a handler by tool name
    pub fn get(&self, name: &str) -> Result<Arc<dyn ToolHandler>, RegistryError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.handlers[i]))
            .ok_or_else(|| RegistryError::ToolNotFound {
                name: name.to_string(),
            })
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
