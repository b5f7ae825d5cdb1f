//! Seams the loop is driven through: where answers come from, and what time it is.

use reviewbot_core::Answer;
use reviewbot_remote::{FetchError, RemoteClient};

/// Anything that can answer "what changed since `from_date`?".
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, from_date: i64) -> Result<Answer, FetchError>;
}

#[async_trait::async_trait]
impl StatusSource for RemoteClient {
    async fn fetch(&self, from_date: i64) -> Result<Answer, FetchError> {
        RemoteClient::fetch(self, from_date).await
    }
}

/// Wall-clock source for the watermark, in Unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
