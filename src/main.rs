use std::path::PathBuf;

use clap::Parser;

use city_api::config::load_config;
use city_api::lifecycle::{signals::shutdown_signal, Application};
use city_api::observability::{logging, metrics};

/// City catalogue API server.
#[derive(Parser, Debug)]
#[command(name = "city-api", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CITY_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        domain = ?config.listener.domain,
        "city-api starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = Application::start(&config).await?;
    tracing::info!(url = %app.server().url(), "Ready");

    app.run_until(shutdown_signal()).await?;
    Ok(())
}
