use std::env;

use anyhow::Context;
use trainingNotifier::cli;
use trainingNotifier::config::{AppConfig, SchedulerConfig};
use trainingNotifier::runtime;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_else(|e| {
            warn!(path = %path, "Ignoring config file: {}", e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    };
    let scheduler_config =
        SchedulerConfig::from_app_config(&config).context("invalid notifier configuration")?;

    let runtime = runtime::start(scheduler_config).await;
    cli::cli(&runtime).await
}
