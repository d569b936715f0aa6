//! Configuration module
//!
//! This module handles loading, merging, and validating the relay
//! configuration from its different sources.

pub mod config;
pub mod defaults;

pub use config::{parse_route_spec, RelayConfig};
pub use defaults::{ENV_PREFIX, ROUTING_PREFIX_LIMIT};
