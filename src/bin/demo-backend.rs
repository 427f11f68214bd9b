//! Demo backend service: three read-only JSON endpoints on port 5000.

use std::path::PathBuf;

use clap::Parser;

use authgate::config::load_backend_config;
use authgate::lifecycle::{run_backend, signals, Shutdown};
use authgate::observability::logging;

#[derive(Parser)]
#[command(name = "demo-backend")]
#[command(about = "Demo JSON backend served behind authgate", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_backend_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.identity.environment,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    run_backend(config, shutdown).await?;
    Ok(())
}
