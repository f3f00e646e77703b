//! Car Price Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "car-price-service", version, about = "Car price estimation API")]
struct Args {
    /// Config file (defaults to ./car-price.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = ServiceConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    init_logging(&config.log_level);

    info!("=== Car Price Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Dataset: {}, model: {}",
        config.data_path.display(),
        config.model_path.display()
    );

    run_server(config).await
}
