//! Default configuration values
//!
//! This module provides default values for configuration options.
//! It is designed to be a single source of truth for defaults,
//! making it easier to maintain consistent defaults across the application.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "TUNNEL_RELAY_";

// String constants for default values

/// Default ingress listen address as string
pub const LISTEN_STR: &str = "0.0.0.0:20347";

/// Default egress listen address as string
pub const EGRESS_LISTEN_STR: &str = "0.0.0.0:20348";

/// Default egress backend address as string
pub const EGRESS_TARGET_STR: &str = "127.0.0.1:6379";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Maximum number of bytes read from a new connection to derive a routing key
pub const ROUTING_PREFIX_LIMIT: usize = 1024;

// Functions for default values

/// Default ingress listen address
pub fn listen() -> SocketAddr {
    SocketAddr::from_str(LISTEN_STR)
        .expect("Default listen address should be valid")
}

/// Default route table (empty; routes must be supplied by configuration)
pub fn routes() -> HashMap<String, SocketAddr> {
    HashMap::new()
}

/// Default egress backend target (none; the egress binary supplies its own)
pub fn target() -> Option<SocketAddr> {
    None
}

/// Default transfer buffer size in bytes
///
/// Larger than the common 4 KiB minimum to keep syscall overhead low on
/// high-throughput payloads.
pub fn buffer_size() -> usize {
    8192
}

/// Default backend connect timeout in seconds
pub fn connect_timeout_secs() -> u64 {
    10
}

/// Default per-direction idle timeout in seconds (0 disables the timeout)
pub fn idle_timeout_secs() -> u64 {
    300
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}
