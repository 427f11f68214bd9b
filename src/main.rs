//! authgate edge proxy.
//!
//! Terminates inbound HTTP, enforces Basic Authentication on every path
//! except the configured exemptions, and forwards to the co-located backend.

use std::path::PathBuf;

use clap::Parser;

use authgate::config::load_proxy_config;
use authgate::lifecycle::{run_proxy, signals, Shutdown};
use authgate::observability::logging;

#[derive(Parser)]
#[command(name = "authgate")]
#[command(about = "Authenticating edge proxy", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_proxy_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("authgate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        response_timeout_ms = config.upstream.response_timeout_ms,
        realm = %config.auth.realm,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    run_proxy(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
