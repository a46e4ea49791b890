use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use arcana::auth::MemoryKeyStore;
use arcana::config::{load_config, AppConfig};
use arcana::http::HttpServer;
use arcana::observability;

#[derive(Parser)]
#[command(name = "arcana", about = "Numerology & astrology content API backend")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "arcana.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        AppConfig::default()
    };

    observability::logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_prefix = %config.api.prefix,
        supported_versions = ?config.api.supported_versions,
        diagnostic_mode = config.observability.diagnostic_mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let keys = match &config.auth.key_file {
        Some(path) => MemoryKeyStore::load_from_file(path)?,
        None => {
            tracing::warn!("No key file configured; every presented API key will be rejected");
            MemoryKeyStore::new(None)
        }
    };
    tracing::info!(keys = keys.count(), "API key store ready");

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, Arc::new(keys));

    match tls {
        Some(tls) => server.run_tls(&tls).await?,
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
