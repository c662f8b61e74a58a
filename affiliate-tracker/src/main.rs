use anyhow::Context;
use tokio_util::sync::CancellationToken;

use affiliate_tracker::api::{ApiServer, AppState};
use affiliate_tracker::config::AppConfig;
use affiliate_tracker::{database, logging, panic_hook};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init_logging(&config.log).context("Failed to initialize logging")?;
    panic_hook::install(config.log.dir.clone());

    let pool = database::connect_and_migrate(&config.database_url)
        .await
        .context("Failed to open database")?;

    let shutdown = CancellationToken::new();
    if let Some(dir) = &config.log.dir {
        logging::start_retention_cleanup(dir, shutdown.clone());
    }

    let state = AppState::from_config(pool.clone(), &config);
    let server = ApiServer::with_state(config.server.clone(), state);

    let server_token = server.cancel_token();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        signal_token.cancel();
        server_token.cancel();
    });

    tracing::info!(
        port = config.server.port,
        strict_referential_integrity = config.strict_referential_integrity,
        "affiliate-tracker starting"
    );

    server.run().await?;

    shutdown.cancel();
    pool.close().await;
    tracing::info!("affiliate-tracker stopped");

    Ok(())
}
