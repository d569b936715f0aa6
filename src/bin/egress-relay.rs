//! Egress relay command line tool
//!
//! Fixed single-backend forwarder: bridges a tunnel endpoint to a local
//! service by relaying every inbound connection to one configured backend.

use clap::Parser;
use log::{info, warn};
use std::sync::Arc;

use tunnel_relay::config::{defaults, RelayConfig};
use tunnel_relay::common::{init_logger, parse_socket_addr, Result};
use tunnel_relay::{RelayServer, RelayTarget, APP_NAME, VERSION};

/// Egress relay: forwards every tunneled connection to one local service
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Listen address
    #[clap(short, long, default_value = defaults::EGRESS_LISTEN_STR)]
    listen: String,

    /// Backend address every connection is forwarded to
    #[clap(short, long, default_value = defaults::EGRESS_TARGET_STR)]
    target: String,

    /// Transfer buffer size in bytes for each relay direction
    #[clap(long, default_value_t = defaults::buffer_size())]
    buffer_size: usize,

    /// Backend connect timeout in seconds
    #[clap(long, default_value_t = defaults::connect_timeout_secs())]
    connect_timeout: u64,

    /// Idle timeout in seconds for each relay direction (0 disables)
    #[clap(long, default_value_t = defaults::idle_timeout_secs())]
    idle_timeout: u64,

    /// Log level
    #[clap(long, default_value = defaults::LOG_LEVEL_STR)]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level);

    info!("Starting {} v{} (egress)", APP_NAME, VERSION);

    let listen = parse_socket_addr(&args.listen)?;
    let target = parse_socket_addr(&args.target)?;

    let mut config = RelayConfig::default();
    config.listen = listen;
    config.target = Some(target);
    config.buffer_size = args.buffer_size;
    config.connect_timeout_secs = args.connect_timeout;
    config.idle_timeout_secs = args.idle_timeout;
    config.log_level = args.log_level.clone();
    config.validate()?;

    info!("Listen address: {}", listen);
    info!("Forwarding to {}", target);

    let server = RelayServer::new(listen, RelayTarget::Fixed(target), Arc::new(config));

    info!("Relay ready, press Ctrl+C to stop");

    server.run(shutdown_signal()).await
}

/// Resolve when the process receives SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = ctrl_c.await;
                info!("Received interrupt signal");
                return;
            }
        };

        tokio::select! {
            _ = ctrl_c => info!("Received interrupt signal"),
            _ = terminate.recv() => info!("Received terminate signal"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received interrupt signal");
    }
}
