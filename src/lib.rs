//! Tunnel Relay: TCP reverse-tunnel relay with virtual-hostname routing
//!
//! This library implements a byte-transparent TCP relay. A public-facing
//! ingress relay derives a routing key from the first bytes of each
//! connection (the leading label of a hostname-like token) and forwards the
//! connection to the backend mapped to that key; an egress relay forwards
//! every connection to one fixed backend. Apart from the routing-key read,
//! the relay never inspects or alters the bytes it forwards.
//!
//! # Main Features
//!
//! - Task-per-connection relaying with independent per-direction copies
//! - Exact-match routing table built once at startup, shared read-only
//! - Graceful shutdown: stops accepting, drains in-flight relays
//! - Bounded backend dials and configurable idle timeouts
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tunnel_relay::config::RelayConfig;
//! use tunnel_relay::router::RouteTable;
//! use tunnel_relay::{RelayServer, RelayTarget, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut routes = HashMap::new();
//!     routes.insert("enjoys".to_string(), "127.0.0.1:6380".parse().unwrap());
//!
//!     let mut config = RelayConfig::default();
//!     config.routes = routes.clone();
//!
//!     let table = Arc::new(RouteTable::new(routes));
//!     let server = RelayServer::new(
//!         config.listen,
//!         RelayTarget::Routed(table),
//!         Arc::new(config),
//!     );
//!
//!     // Run until Ctrl+C, then drain in-flight connections
//!     server.run(async { let _ = tokio::signal::ctrl_c().await; }).await
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod relay;
pub mod router;

// Re-export commonly used structures and functions for convenience
pub use common::{parse_socket_addr, RelayError, Result};
pub use relay::{RelayServer, RelayTarget};
pub use router::RouteTable;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
