use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;

use wiresx2aprs::config;
use wiresx2aprs::logging;
use wiresx2aprs::module::aprs::AprsSession;
use wiresx2aprs::module::bridge::Bridge;
use wiresx2aprs::module::scheduled::ScheduledTaskManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (fatal on any missing/invalid setting)
    let config_path = parse_args();
    config::read_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    let config = config::CONFIG.get().unwrap();

    // Initialize logging
    let _logging_guard = logging::init_logging("logs", "wiresx2aprs", &config.log_level);

    tracing::info!("Starting Wires-X to APRS");
    tracing::info!("Wires-X log file path: {}", config.wiresx.log_file_path);

    let timezone = config.timezone()?;

    // Connect and log in to APRS-IS; the receive task starts with the
    // connection. Login is fire-and-forget, per the APRS-IS protocol.
    let session = Arc::new(AprsSession::new());
    session
        .connect(&config.aprs_is.address, config.aprs_is.port)
        .await?;
    session
        .login(
            &config.aprs_is.callsign,
            &config.aprs_is.password,
            &config.aprs_is.filter,
        )
        .await?;

    let bridge = Arc::new(Bridge::new(
        config.wiresx.log_file_path.clone(),
        timezone,
        config.aprs_is.comment.clone(),
        TimeDelta::seconds(config.bridge.staleness_margin_secs as i64),
        session.clone(),
    ));

    let mut tasks = ScheduledTaskManager::new(
        Duration::from_secs(config.bridge.poll_interval_secs),
        bridge,
        session,
    );
    tasks.start();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Stop Wires-X to APRS");
    tasks.stop().await;

    Ok(())
}

/// Minimal `-c/--config <path>` scan; defaults to `config.toml`.
fn parse_args() -> String {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-c" || arg == "--config" {
            if let Some(path) = args.next() {
                return path;
            }
        }
    }
    "config.toml".to_string()
}
