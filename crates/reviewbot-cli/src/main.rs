mod config;

use anyhow::Context;
use clap::Parser;
use reviewbot_notify::TelegramNotifier;
use reviewbot_poll::{PollLoop, SystemClock};
use reviewbot_remote::RemoteClient;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("reviewbot v{}", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::from_cli(Cli::parse()) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "refusing to start");
            std::process::exit(1);
        }
    };

    let source = RemoteClient::new(
        settings.endpoint,
        settings.practicum_token,
        settings.request_timeout,
    )
    .context("building status endpoint client")?;
    let notifier = TelegramNotifier::new(
        settings.telegram_api,
        settings.telegram_token,
        settings.telegram_chat_id,
        settings.request_timeout,
    )
    .context("building Telegram client")?;

    let watermark = settings
        .from_date
        .unwrap_or_else(|| chrono::Utc::now().timestamp());
    let mut poll = PollLoop::new(
        source,
        notifier,
        SystemClock,
        settings.retry_interval,
        watermark,
    );
    poll.run().await;
    Ok(())
}
