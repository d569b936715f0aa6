//! Routing module
//!
//! This module derives a routing key from the first bytes of a new
//! connection and resolves it to a backend address.
//!
//! Client convention: the first bytes of a connection must start with a
//! hostname-like token (for example `enjoys.tunnel.example`) terminated by
//! CR, LF, space, tab, or the end of the first segment. The routing key is
//! the token's first dot-delimited label; with no dot the whole token is the
//! key. The bytes read for extraction are part of the client's stream and
//! are forwarded to the backend unmodified before relaying begins, so the
//! relay stays byte-transparent end to end.

use bytes::{Bytes, BytesMut};
use log::debug;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::common::{RelayError, Result};
use crate::config::ROUTING_PREFIX_LIMIT;

/// Read-only routing table mapping routing keys to backend addresses
///
/// Built once at startup and shared by all connection handlers. It is never
/// mutated after construction, so concurrent lookups need no synchronization.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, SocketAddr>,
}

impl RouteTable {
    /// Create a route table from a key-to-backend mapping
    pub fn new(routes: HashMap<String, SocketAddr>) -> Self {
        Self { routes }
    }

    /// Resolve a routing key to its backend address
    ///
    /// Lookup is exact-match only; there is no wildcard or prefix matching.
    ///
    /// # Parameters
    ///
    /// * `key` - Routing key extracted from the connection's opening bytes
    ///
    /// # Returns
    ///
    /// Returns the backend address, or `RelayError::UnknownKey` if the key
    /// has no route.
    pub fn resolve(&self, key: &str) -> Result<SocketAddr> {
        self.routes
            .get(key)
            .copied()
            .ok_or_else(|| RelayError::UnknownKey(key.to_string()))
    }

    /// Number of routes in the table
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Read the routing prefix from a new connection
///
/// Performs a single bounded read of at most `ROUTING_PREFIX_LIMIT` bytes.
/// The returned bytes belong to the client's stream and must be forwarded to
/// the backend once a route is established.
///
/// # Parameters
///
/// * `stream` - The newly accepted client stream
/// * `read_timeout` - Optional bound on how long to wait for the first bytes
///
/// # Returns
///
/// Returns the bytes read, or `RelayError::Extraction` if the connection
/// closed or timed out before sending anything.
pub async fn read_routing_prefix(
    stream: &mut TcpStream,
    read_timeout: Option<Duration>,
) -> Result<Bytes> {
    let mut buffer = BytesMut::with_capacity(ROUTING_PREFIX_LIMIT);

    let read_result = match read_timeout {
        Some(limit) => timeout(limit, stream.read_buf(&mut buffer))
            .await
            .map_err(|_| {
                RelayError::Extraction("Timed out waiting for routing bytes".to_string())
            })?,
        None => stream.read_buf(&mut buffer).await,
    };

    let n = read_result.map_err(RelayError::Io)?;
    if n == 0 {
        return Err(RelayError::Extraction(
            "Connection closed before sending routing bytes".to_string(),
        ));
    }

    debug!("Read {} routing prefix bytes", n);
    Ok(buffer.freeze())
}

/// Extract a routing key from the routing prefix
///
/// The token is the prefix up to the first CR, LF, space, or tab (or the
/// whole prefix when none is present); the key is the token's first
/// dot-delimited label.
///
/// # Parameters
///
/// * `prefix` - Bytes read from the start of the connection
///
/// # Returns
///
/// Returns the routing key, or `RelayError::Extraction` if the prefix holds
/// no usable token.
pub fn extract_routing_key(prefix: &[u8]) -> Result<String> {
    let end = prefix
        .iter()
        .position(|b| matches!(b, b'\r' | b'\n' | b' ' | b'\t'))
        .unwrap_or(prefix.len());
    let token = &prefix[..end];

    if token.is_empty() {
        return Err(RelayError::Extraction(
            "Empty routing token".to_string(),
        ));
    }

    let token = std::str::from_utf8(token).map_err(|_| {
        RelayError::Extraction("Routing token is not valid UTF-8".to_string())
    })?;

    let key = token.split('.').next().unwrap_or("");
    if key.is_empty() {
        return Err(RelayError::Extraction(format!(
            "Routing token '{}' has an empty leading label", token
        )));
    }

    Ok(key.to_string())
}
