//! Telegram Bot API `sendMessage` client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Notifier, NotifyError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Posts messages to one chat as one bot.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// `api_url` should be like `https://api.telegram.org` (no trailing slash).
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let api_url: String = api_url.into();
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn method_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token)
    }
}

/// The request URL embeds the bot token; keep it out of error text and logs.
fn redact(err: reqwest::Error) -> NotifyError {
    NotifyError::Http(err.without_url())
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        let resp = self
            .client
            .post(self.method_url())
            .json(&payload)
            .send()
            .await
            .map_err(redact)?;

        let status = resp.status();
        let body = resp.text().await.map_err(redact)?;
        let reply: Option<ApiReply> = serde_json::from_str(&body).ok();
        match reply {
            Some(ApiReply { ok: true, .. }) if status.is_success() => {
                info!(chat_id = %self.chat_id, "message sent to chat");
                Ok(())
            }
            Some(reply) => Err(NotifyError::Api {
                status: status.as_u16(),
                description: reply
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(NotifyError::Api {
                status: status.as_u16(),
                description: "unreadable reply".to_string(),
            }),
        }
    }
}
