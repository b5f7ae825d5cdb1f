//! HTTP client for the homework status endpoint.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reviewbot_core::Answer;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Why a status request produced no usable answer.
///
/// Messages carry no per-request data (timestamps, query strings) so that
/// the same fault renders to the same text on every cycle.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no response from the status endpoint within {0:?}")]
    Timeout(Duration),
    #[error("could not reach the status endpoint: {0}")]
    Connection(String),
    #[error("endpoint {url} is unavailable, response code {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Client for the status endpoint, authorised with an OAuth token.
pub struct RemoteClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    timeout: Duration,
}

impl RemoteClient {
    /// Create a client for `endpoint` that gives up on a request after `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            timeout,
        })
    }

    /// Request statuses updated since `from_date` (Unix seconds).
    pub async fn fetch(&self, from_date: i64) -> Result<Answer, FetchError> {
        info!(endpoint = %self.endpoint, from_date, "requesting homework statuses");
        let resp = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.classify(e))?;
        let answer = Answer::from_json(&body)?;
        debug!(current_date = ?answer.current_date, "status response decoded");
        Ok(answer)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            // The URL carries the from_date query, which changes every cycle.
            FetchError::Connection(describe(&err.without_url()))
        }
    }
}

/// Render an error and all of its sources as one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}
