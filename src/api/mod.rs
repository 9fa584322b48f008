//! HTTP API: server, SSE log stream, and response types.

pub mod logs;
pub mod server;
pub mod types;
