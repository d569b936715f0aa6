//! Connection handler module
//!
//! This module handles individual client connections: backend resolution,
//! the bounded dial, and handing off to the relay loop.

use log::{debug, info};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::common::{RelayError, Result};
use crate::config::RelayConfig;
use crate::router::{extract_routing_key, read_routing_prefix};

use super::forwarder::relay_data;
use super::server::RelayTarget;

/// Handle a single client connection
///
/// Resolves the backend address (via the route table for a routed target, or
/// statically for a fixed one), dials the backend with a bounded connect
/// attempt, forwards any bytes already read for routing, and runs the relay
/// loop. Dial failures are not retried. Both streams are closed by drop on
/// every exit path.
///
/// # Parameters
///
/// * `client_stream` - Client TCP stream
/// * `client_addr` - Client remote address (for logging)
/// * `target` - Backend resolution mode
/// * `config` - Relay configuration
///
/// # Returns
///
/// Returns `Ok(())` if the relay ran to completion, otherwise the error that
/// terminated this connection.
pub async fn handle_connection(
    mut client_stream: TcpStream,
    client_addr: SocketAddr,
    target: RelayTarget,
    config: &RelayConfig,
) -> Result<()> {
    // Resolve the backend; for routed targets this consumes the connection's
    // opening bytes, which must be forwarded once the backend leg is up.
    let (backend_addr, prefix) = match &target {
        RelayTarget::Fixed(addr) => (*addr, None),
        RelayTarget::Routed(table) => {
            let prefix = read_routing_prefix(&mut client_stream, config.idle_timeout()).await?;
            let key = extract_routing_key(&prefix)?;
            let backend_addr = table.resolve(&key)?;
            info!("Routing {} with key '{}' to {}", client_addr, key, backend_addr);
            (backend_addr, Some(prefix))
        }
    };

    // Dial the backend with a bounded connect attempt; no retry
    let mut backend_stream = timeout(config.connect_timeout(), TcpStream::connect(backend_addr))
        .await
        .map_err(|_| RelayError::Dial(format!("{}: connect timed out", backend_addr)))?
        .map_err(|e| RelayError::Dial(format!("{}: {}", backend_addr, e)))?;

    // The extraction prefix is part of the client's stream; forward it
    // verbatim before relaying so the backend sees an unmodified byte stream
    if let Some(prefix) = prefix {
        backend_stream
            .write_all(&prefix)
            .await
            .map_err(|e| RelayError::Dial(format!("{}: {}", backend_addr, e)))?;
    }

    debug!("Relaying {} <-> {}", client_addr, backend_addr);
    relay_data(
        client_stream,
        backend_stream,
        config.buffer_size,
        config.idle_timeout(),
    )
    .await
}
