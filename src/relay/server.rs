//! Relay server module
//!
//! This module implements the core of the relay: accepting connections,
//! dispatching them to connection handlers, and draining in-flight relays on
//! shutdown.

use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::common::{RelayError, Result};
use crate::config::RelayConfig;
use crate::router::RouteTable;

use super::handler::handle_connection;

/// Backend resolution mode for a relay deployment
///
/// One server type covers both deployments of the relay pattern: the
/// public-facing ingress relay routes each connection by its extracted key,
/// the egress relay forwards every connection to one fixed backend.
#[derive(Debug, Clone)]
pub enum RelayTarget {
    /// Route by the key extracted from the connection's opening bytes
    Routed(Arc<RouteTable>),
    /// Forward every connection to a single fixed backend
    Fixed(SocketAddr),
}

/// Relay server structure
///
/// Owns the listening socket, accepts client connections, and dispatches
/// each to a connection handler task. On shutdown it stops accepting and
/// drains the outstanding handlers before returning.
pub struct RelayServer {
    /// Listen address for the relay
    listen_addr: SocketAddr,
    /// Backend resolution mode
    target: RelayTarget,
    /// Relay configuration (wrapped in Arc for efficient sharing)
    config: Arc<RelayConfig>,
}

impl RelayServer {
    /// Create a new relay server instance
    ///
    /// # Parameters
    ///
    /// * `listen_addr` - Listen address
    /// * `target` - Backend resolution mode
    /// * `config` - Relay configuration
    ///
    /// # Returns
    ///
    /// Returns a new relay server instance
    pub fn new(
        listen_addr: impl Into<SocketAddr>,
        target: RelayTarget,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            target,
            config,
        }
    }

    /// Start the relay service
    ///
    /// Binds the listening socket and serves connections until the shutdown
    /// future resolves, then drains in-flight relays before returning.
    ///
    /// # Parameters
    ///
    /// * `shutdown` - Future that resolves when the relay should stop
    ///   accepting new connections
    ///
    /// # Returns
    ///
    /// Returns an error if the listen address cannot be bound.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let listener = TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| RelayError::Bind(format!("{}: {}", self.listen_addr, e)))?;

        self.serve(listener, shutdown).await
    }

    /// Serve connections on an already-bound listener
    ///
    /// Accepting never blocks on any one connection's lifetime: each accepted
    /// connection is handled by its own task. Transient accept errors are
    /// logged and the loop continues. When the shutdown future resolves the
    /// listening socket is closed and the method blocks until every
    /// dispatched handler has completed.
    ///
    /// # Parameters
    ///
    /// * `listener` - Bound TCP listener to accept on
    /// * `shutdown` - Future that resolves when the relay should stop
    ///   accepting new connections
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let local_addr = listener.local_addr().map_err(RelayError::Io)?;
        info!("Relay started, listening on {}", local_addr);

        // The JoinSet is the outstanding-connection set: one entry per
        // dispatched handler, reaped as handlers finish, drained on shutdown.
        let mut tasks: JoinSet<()> = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((client_stream, client_addr)) => {
                            debug!("Accepted connection from {}", client_addr);

                            let target = self.target.clone();
                            let config = Arc::clone(&self.config);
                            tasks.spawn(async move {
                                if let Err(e) =
                                    handle_connection(client_stream, client_addr, target, &config).await
                                {
                                    warn!("Connection from {} closed: {}", client_addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                        }
                    }
                }

                // Reap finished handlers so the set does not grow unbounded
                Some(result) = tasks.join_next() => {
                    if let Err(e) = result {
                        error!("Connection task error: {}", e);
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received, draining {} active connections", tasks.len());
                    break;
                }
            }
        }

        // Stop accepting new connections, then let in-flight relays run to
        // natural completion
        drop(listener);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!("Connection task error during drain: {}", e);
            }
        }

        info!("Relay shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_server_new() {
        let config = Arc::new(RelayConfig::default());
        let server = RelayServer::new(
            "127.0.0.1:20347".parse::<SocketAddr>().unwrap(),
            RelayTarget::Fixed("127.0.0.1:6379".parse().unwrap()),
            config,
        );

        assert_eq!(server.listen_addr.port(), 20347);
        match server.target {
            RelayTarget::Fixed(addr) => assert_eq!(addr.port(), 6379),
            RelayTarget::Routed(_) => panic!("Expected a fixed target"),
        }
    }

    #[tokio::test]
    async fn test_run_fails_when_address_is_taken() {
        // Occupy a port so the server's own bind fails
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = occupied.local_addr().unwrap();

        let config = Arc::new(RelayConfig::default());
        let server = RelayServer::new(
            addr,
            RelayTarget::Fixed("127.0.0.1:6379".parse().unwrap()),
            config,
        );

        match server.run(std::future::pending()).await {
            Err(RelayError::Bind(_)) => {}
            other => panic!("Expected Bind error, got {:?}", other.map(|_| ())),
        }
    }
}
