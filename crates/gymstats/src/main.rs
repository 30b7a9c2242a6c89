//! Main entry point for gymstats.

use anyhow::Context;
use gymstats::{load_dataset, resolve_dataset_path, GymStats};
use gymstats_common::init_logging;
use gymstats_config::ConfigLoader;
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;
    init_logging(config.logging.to_logging_config()).context("Failed to initialize logging")?;

    info!(timezone = %config.reporting.timezone, "Starting gymstats");

    let path = resolve_dataset_path(env::args().nth(1), |key| env::var(key).ok())?;
    let dataset = load_dataset(&path).await?;

    let app = GymStats::new(config)?;
    let snapshot = match app.run(dataset, chrono::Utc::now()).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to compute statistics: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", snapshot.to_json_pretty()?);
    Ok(())
}
