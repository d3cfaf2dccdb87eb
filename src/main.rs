use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use ema_alert::alert::TelegramNotifier;
use ema_alert::config::AlertConfig;
use ema_alert::feed::YahooChartClient;
use ema_alert::scheduler::Scheduler;
use ema_alert::util::{health, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init_tracing()?;

    info!("📈 EMA Trading Alert Bot");
    info!("========================");

    let config = AlertConfig::from_env().context("invalid configuration")?;
    info!(config = %serde_json::to_string(&config)?, "Configuration loaded");

    if let Some(port) = config.health_port {
        health::spawn(port);
    }

    let feed = YahooChartClient::new(&config.market.feed_api_base, config.feed_timeout())
        .context("failed to build feed client")?;
    let notifier = TelegramNotifier::new(
        &config.notify.api_base,
        config.notify.credentials.clone(),
        config.notify_timeout(),
    )
    .context("failed to build notifier")?;

    if !notifier.is_configured() {
        warn!("BOT_TOKEN or CHAT_ID not set; alerts will be logged but not delivered");
    }

    let mut scheduler = Scheduler::new(config, feed, notifier);

    tokio::select! {
        _ = scheduler.run() => {}
        _ = shutdown_signal() => info!("🛑 Shutdown signal received"),
    }

    info!("👋 EMA alert bot stopped");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the bot keeps running.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
