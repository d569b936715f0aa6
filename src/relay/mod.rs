//! Relay module
//!
//! This module implements the connection relay engine: the accept loop with
//! graceful drain, per-connection handling, and bidirectional forwarding.

pub mod forwarder;
pub mod handler;
pub mod server;

pub use forwarder::relay_data;
pub use handler::handle_connection;
pub use server::{RelayServer, RelayTarget};
