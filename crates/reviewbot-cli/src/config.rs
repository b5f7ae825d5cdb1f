//! Command-line and environment configuration.
//!
//! The three secrets are read as optional values so that a missing one is
//! reported by [`Settings::from_cli`] (all at once, exit status 1) rather
//! than by clap's usage error.

use std::time::Duration;

use clap::Parser;
use reviewbot_notify::DEFAULT_API_URL;
use reviewbot_remote::DEFAULT_ENDPOINT;
use thiserror::Error;

/// Default pause between poll cycles, in seconds.
pub const RETRY_TIME: u64 = 600;
/// Default bound on each outbound HTTP request, in seconds.
pub const REQUEST_TIMEOUT: u64 = 5;

#[derive(Parser)]
#[command(
    name = "reviewbot",
    version,
    about = "Poll homework review statuses and forward changes to a Telegram chat"
)]
pub struct Cli {
    /// OAuth token for the homework status API
    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Destination chat id
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Homework status endpoint
    #[arg(long, env = "HOMEWORK_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_API_URL)]
    pub telegram_api: String,

    /// Seconds to sleep between poll cycles
    #[arg(
        long,
        env = "RETRY_TIME",
        default_value_t = RETRY_TIME,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub retry_secs: u64,

    /// Seconds to wait for each HTTP response
    #[arg(
        long,
        env = "REQUEST_TIMEOUT",
        default_value_t = REQUEST_TIMEOUT,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Initial watermark (Unix seconds); defaults to the current time
    #[arg(long, env = "FROM_DATE")]
    pub from_date: Option<i64>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StartupError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
}

/// Validated runtime settings.
pub struct Settings {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub endpoint: String,
    pub telegram_api: String,
    pub retry_interval: Duration,
    pub request_timeout: Duration,
    pub from_date: Option<i64>,
}

impl Settings {
    /// Check that every secret is present and non-empty.
    pub fn from_cli(cli: Cli) -> Result<Self, StartupError> {
        let mut missing = Vec::new();
        let practicum_token = required(cli.practicum_token, "PRACTICUM_TOKEN", &mut missing);
        let telegram_token = required(cli.telegram_token, "TELEGRAM_TOKEN", &mut missing);
        let telegram_chat_id = required(cli.telegram_chat_id, "TELEGRAM_CHAT_ID", &mut missing);

        match (practicum_token, telegram_token, telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Ok(Self {
                practicum_token,
                telegram_token,
                telegram_chat_id,
                endpoint: cli.endpoint,
                telegram_api: cli.telegram_api,
                retry_interval: Duration::from_secs(cli.retry_secs),
                request_timeout: Duration::from_secs(cli.timeout_secs),
                from_date: cli.from_date,
            }),
            _ => Err(StartupError::MissingConfig(missing)),
        }
    }
}

fn required(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            missing.push(name);
            None
        }
    }
}
