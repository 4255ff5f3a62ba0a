//! Shared entity types for the MCP gateway.
//!
//! `mcp-common` holds the data model the gateway reads from configuration
//! and the router's catalog: upstream server configuration, and the
//! discovered tool/resource/prompt records each upstream advertises. None of
//! these types are MCP wire messages (those live in `mcp-core`) -- they are
//! the gateway's own bookkeeping about what servers exist and what they can
//! do.

pub mod types;

pub use types::*;
