use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use zepartners::{init_logging, PartnerRegistry, Server, ServerConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    let logging = init_logging(&settings.logging).context("Failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_COMMIT"),
        build_time = env!("BUILD_TIME"),
        snapshot = %settings.snapshot_path.display(),
        "Starting zepartners"
    );

    let (registry, diagnostics) = PartnerRegistry::open(&settings.snapshot_path)
        .with_context(|| format!("Failed to read {}", settings.snapshot_path.display()))?;
    if !diagnostics.is_empty() {
        warn!(
            count = diagnostics.len(),
            "Snapshot loaded with diagnostics"
        );
    }

    let server = Server::bind(ServerConfig::from(&settings), Arc::new(registry)).await?;
    let shutdown = server.shutdown_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.shutdown();
        }
    });

    let result = server.run().await;
    logging.shutdown();
    result
}
