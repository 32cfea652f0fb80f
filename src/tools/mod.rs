//! Tools module - Tool implementations for the agent
//!
//! Contains the web search tool and the tool registry.

pub mod registry;
pub mod search;

pub use registry::ToolRegistry;
pub use search::{SearchProvider, TavilyClient};
