//! Configuration structures and methods
//!
//! This module defines the relay configuration structure and related methods
//! for loading configuration from different sources (command-line arguments,
//! environment variables, and configuration files).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::common::{parse_socket_addr, RelayError, Result};
use crate::config::defaults;

/// Relay configuration
///
/// Contains all configuration options needed for the relay. Supports loading
/// from command-line arguments, environment variables, and configuration
/// files. The route table lives here so no process-wide mutable state is
/// needed; it is frozen into a `RouteTable` before the server starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct RelayConfig {
    /// Listen address for the relay
    #[serde(default = "defaults::listen")]
    pub listen: SocketAddr,

    /// Routing table: routing key to backend address (ingress relay)
    #[serde(default = "defaults::routes")]
    pub routes: HashMap<String, SocketAddr>,

    /// Fixed backend address (egress relay)
    #[serde(default = "defaults::target")]
    pub target: Option<SocketAddr>,

    /// Transfer buffer size in bytes for each relay direction
    #[serde(default = "defaults::buffer_size")]
    pub buffer_size: usize,

    /// Backend connect timeout in seconds
    #[serde(default = "defaults::connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Per-direction idle timeout in seconds; 0 disables the timeout
    #[serde(default = "defaults::idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Log level (debug, info, warn, error)
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

impl Default for RelayConfig {
    /// Create a default configuration using centralized defaults
    fn default() -> Self {
        Self {
            listen: defaults::listen(),
            routes: defaults::routes(),
            target: defaults::target(),
            buffer_size: defaults::buffer_size(),
            connect_timeout_secs: defaults::connect_timeout_secs(),
            idle_timeout_secs: defaults::idle_timeout_secs(),
            log_level: defaults::log_level(),
        }
    }
}

impl RelayConfig {
    /// Create configuration from command line arguments
    ///
    /// # Parameters
    ///
    /// * `listen` - Listen address
    /// * `routes` - Route specifications in `key=host:port` form
    /// * `buffer_size` - Transfer buffer size in bytes
    /// * `connect_timeout_secs` - Backend connect timeout in seconds
    /// * `idle_timeout_secs` - Idle timeout in seconds (0 disables)
    /// * `log_level` - Log level
    ///
    /// # Returns
    ///
    /// Returns the configuration result
    pub fn from_args(
        listen: &str,
        routes: &[String],
        buffer_size: usize,
        connect_timeout_secs: u64,
        idle_timeout_secs: u64,
        log_level: &str,
    ) -> Result<Self> {
        let listen = parse_socket_addr(listen)?;

        let mut route_table = HashMap::new();
        for spec in routes {
            let (key, addr) = parse_route_spec(spec)?;
            route_table.insert(key, addr);
        }

        Ok(Self {
            listen,
            routes: route_table,
            target: defaults::target(),
            buffer_size,
            connect_timeout_secs,
            idle_timeout_secs,
            log_level: log_level.to_string(),
        })
    }

    /// Merge another configuration into this one
    ///
    /// Values from `other` override values in `self` unless they are the
    /// defaults. This implements the configuration priority system
    /// (defaults < file < environment/flags).
    ///
    /// # Parameters
    ///
    /// * `other` - The configuration to merge into this one
    ///
    /// # Returns
    ///
    /// Returns a new configuration with merged values
    pub fn merge(&self, other: Self) -> Self {
        let defaults = Self::default();
        Self {
            listen: if other.listen != defaults.listen { other.listen } else { self.listen },
            routes: if !other.routes.is_empty() { other.routes } else { self.routes.clone() },
            target: other.target.or(self.target),
            buffer_size: if other.buffer_size != defaults.buffer_size {
                other.buffer_size
            } else {
                self.buffer_size
            },
            connect_timeout_secs: if other.connect_timeout_secs != defaults.connect_timeout_secs {
                other.connect_timeout_secs
            } else {
                self.connect_timeout_secs
            },
            idle_timeout_secs: if other.idle_timeout_secs != defaults.idle_timeout_secs {
                other.idle_timeout_secs
            } else {
                self.idle_timeout_secs
            },
            log_level: if other.log_level != defaults.log_level {
                other.log_level
            } else {
                self.log_level.clone()
            },
        }
    }

    /// Build a configuration overlay from `TUNNEL_RELAY_*` environment
    /// variables
    ///
    /// Unset variables leave the corresponding field at its default, so the
    /// result is meant to be merged over a base configuration.
    ///
    /// # Returns
    ///
    /// Returns the configuration result
    pub fn from_env() -> Result<Self> {
        let get_env = |name: &str| -> Option<String> {
            env::var(format!("{}{}", defaults::ENV_PREFIX, name)).ok()
        };

        let mut env_config = Self::default();

        if let Some(listen) = get_env("LISTEN") {
            env_config.listen = parse_socket_addr(&listen)?;
        }

        if let Some(routes) = get_env("ROUTES") {
            let mut table = HashMap::new();
            for spec in routes.split(',').filter(|s| !s.trim().is_empty()) {
                let (key, addr) = parse_route_spec(spec)?;
                table.insert(key, addr);
            }
            env_config.routes = table;
        }

        if let Some(target) = get_env("TARGET") {
            env_config.target = Some(parse_socket_addr(&target)?);
        }

        if let Some(buffer_size) = get_env("BUFFER_SIZE") {
            env_config.buffer_size = buffer_size.parse().map_err(|_| {
                RelayError::Config(format!("Invalid buffer size: {}", buffer_size))
            })?;
        }

        if let Some(connect_timeout) = get_env("CONNECT_TIMEOUT") {
            env_config.connect_timeout_secs = connect_timeout.parse().map_err(|_| {
                RelayError::Config(format!("Invalid connect timeout: {}", connect_timeout))
            })?;
        }

        if let Some(idle_timeout) = get_env("IDLE_TIMEOUT") {
            env_config.idle_timeout_secs = idle_timeout.parse().map_err(|_| {
                RelayError::Config(format!("Invalid idle timeout: {}", idle_timeout))
            })?;
        }

        if let Some(log_level) = get_env("LOG_LEVEL") {
            env_config.log_level = log_level;
        }

        Ok(env_config)
    }

    /// Load configuration from a JSON file
    ///
    /// # Parameters
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// Returns the configuration result
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!(
                "Failed to read configuration file {}: {}", path.display(), e
            )))?;

        serde_json::from_str(&content)
            .map_err(|e| RelayError::Config(format!(
                "Failed to parse JSON configuration file {}: {}", path.display(), e
            )))
    }

    /// Validate configuration
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` if configuration is valid, otherwise returns an error.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(RelayError::Config(
                "Transfer buffer size must be greater than zero".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(RelayError::Config(
                "Backend connect timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Backend connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Idle timeout as a `Duration`, `None` when disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_secs))
        }
    }
}

/// Parse a `key=host:port` route specification
///
/// # Parameters
///
/// * `spec` - Route specification string
///
/// # Returns
///
/// Returns the routing key and backend address pair
pub fn parse_route_spec(spec: &str) -> Result<(String, SocketAddr)> {
    let (key, addr) = spec.split_once('=').ok_or_else(|| {
        RelayError::Config(format!(
            "Invalid route specification '{}': expected key=host:port", spec
        ))
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(RelayError::Config(format!(
            "Invalid route specification '{}': empty routing key", spec
        )));
    }

    let addr = parse_socket_addr(addr.trim())?;
    Ok((key.to_string(), addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.listen.port(), 20347);
        assert!(config.routes.is_empty());
        assert!(config.target.is_none());
        assert_eq!(config.buffer_size, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_args() {
        let routes = vec!["enjoys=127.0.0.1:6380".to_string()];
        let config = RelayConfig::from_args("127.0.0.1:20347", &routes, 8192, 10, 300, "info")
            .expect("Should be able to create configuration");

        assert_eq!(config.listen.port(), 20347);
        assert_eq!(
            config.routes.get("enjoys").map(|a| a.port()),
            Some(6380)
        );
    }

    #[test]
    fn test_parse_route_spec() {
        let (key, addr) = parse_route_spec("enjoys=127.0.0.1:6380")
            .expect("Should parse a valid route spec");
        assert_eq!(key, "enjoys");
        assert_eq!(addr.port(), 6380);

        assert!(parse_route_spec("missing-delimiter").is_err());
        assert!(parse_route_spec("=127.0.0.1:6380").is_err());
        assert!(parse_route_spec("enjoys=not-an-address").is_err());
    }

    #[test]
    fn test_merge_priority() {
        let base = RelayConfig::default();

        let mut overlay = RelayConfig::default();
        overlay.buffer_size = 16384;
        overlay.routes.insert("enjoys".to_string(), "127.0.0.1:6380".parse().unwrap());

        let merged = base.merge(overlay);
        assert_eq!(merged.buffer_size, 16384);
        assert_eq!(merged.routes.len(), 1);
        // Untouched fields keep their original values
        assert_eq!(merged.listen, defaults::listen());
        assert_eq!(merged.idle_timeout_secs, defaults::idle_timeout_secs());
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let mut config = RelayConfig::default();
        config.buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_idle_timeout_zero_disables() {
        let mut config = RelayConfig::default();
        config.idle_timeout_secs = 0;
        assert!(config.idle_timeout().is_none());

        config.idle_timeout_secs = 30;
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
    }
}
