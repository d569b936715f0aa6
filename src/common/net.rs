//! Network utility functions

use std::net::{SocketAddr, ToSocketAddrs};

use super::error::{RelayError, Result};

/// Parse a `host:port` string into a socket address
///
/// Literal addresses parse directly; anything else goes through system name
/// resolution so hostnames are usable in route tables and configs, taking
/// the first resolved address.
pub fn parse_socket_addr(addr: &str) -> Result<SocketAddr> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        return Ok(socket_addr);
    }

    addr.to_socket_addrs()
        .map_err(|e| RelayError::Config(format!("Failed to parse address {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| RelayError::Config(format!("Address {} resolved to nothing", addr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal_address() {
        let addr = parse_socket_addr("127.0.0.1:6380").expect("Should parse a literal address");
        assert_eq!(addr.port(), 6380);
    }

    #[test]
    fn test_parse_hostname() {
        let addr = parse_socket_addr("localhost:20347");
        assert!(addr.is_ok(), "Should resolve a local hostname");
    }

    #[test]
    fn test_parse_invalid_address() {
        assert!(parse_socket_addr("invalid-address").is_err());
        assert!(parse_socket_addr("").is_err());
    }
}
