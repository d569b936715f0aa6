//! Ingress relay command line tool
//!
//! Public-facing relay: routes each inbound connection to a backend chosen
//! by the routing key extracted from the connection's opening bytes.

use clap::Parser;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use tunnel_relay::config::{defaults, RelayConfig};
use tunnel_relay::common::{init_logger, RelayError, Result};
use tunnel_relay::{RelayServer, RelayTarget, RouteTable, APP_NAME, VERSION};

/// Ingress relay: routes tunneled TCP connections by virtual hostname
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Listen address
    #[clap(short, long, default_value = defaults::LISTEN_STR)]
    listen: String,

    /// Route entry as key=host:port (may be repeated)
    #[clap(short, long = "route")]
    routes: Vec<String>,

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

    /// Load configuration from environment variables
    #[clap(long)]
    from_env: bool,

    /// Load configuration from a JSON file
    #[clap(long)]
    config_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    init_logger(&args.log_level);

    info!("Starting {} v{} (ingress)", APP_NAME, VERSION);

    // Create default configuration
    let mut config = RelayConfig::default();

    // Load from configuration file if specified
    if let Some(config_file) = args.config_file.as_deref() {
        if Path::new(config_file).exists() {
            info!("Loading configuration from file: {}", config_file);
            config = config.merge(RelayConfig::from_file(config_file)?);
        } else {
            warn!("Configuration file not found: {}", config_file);
        }
    }

    if args.from_env {
        // Load from environment variables
        info!("Loading configuration from environment variables");
        config = config.merge(RelayConfig::from_env()?);
    } else {
        // Load from command line arguments
        info!("Loading configuration from command line arguments");
        let cmd_config = RelayConfig::from_args(
            &args.listen,
            &args.routes,
            args.buffer_size,
            args.connect_timeout,
            args.idle_timeout,
            &args.log_level,
        )?;
        config = config.merge(cmd_config);
    }

    // Validate the final configuration
    config.validate()?;

    if config.routes.is_empty() {
        return Err(RelayError::Config(
            "Ingress relay requires at least one route (see --route)".to_string(),
        ));
    }

    info!("Listen address: {}", config.listen);
    for (key, backend) in &config.routes {
        info!("Route: {} -> {}", key, backend);
    }

    // Freeze the route table; it is read-only for the process lifetime
    let table = Arc::new(RouteTable::new(config.routes.clone()));

    let server = RelayServer::new(config.listen, RelayTarget::Routed(table), Arc::new(config));

    info!("Relay ready, press Ctrl+C to stop");

    // Run until interrupted, then drain in-flight connections
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
