//! Downstream Transport Adapter: exposes the Router's merged MCP surface
//! to a downstream client, either over stdio or HTTP.
//!
//! Grounded on `mcp-core/src/transport/stdio.rs`'s line-delimited framing
//! (reused here for the opposite direction: serving instead of dialing)
//! and the pack's axum-based MCP servers (e.g. `michiel-ratchet`'s
//! `axum-mcp`) for the HTTP side.

pub mod dispatch;
pub mod http;
pub mod stdio;

pub use dispatch::handle_message;
