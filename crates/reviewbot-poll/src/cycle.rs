//! One poll cycle and the loop that repeats it.

use std::time::Duration;

use reviewbot_core::{FormatError, ValidationError, format, validate};
use reviewbot_notify::{Notifier, NotifyError};
use reviewbot_remote::FetchError;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::source::{Clock, StatusSource, SystemClock};
use crate::state::PollState;

/// Everything that makes a cycle fail. Caught at the loop boundary.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Status change sent with its verdict.
    Delivered,
    /// Status code was not in the catalog; a degraded notice was sent.
    DeliveredUnknown,
    /// The cycle failed. `notified` is true if a failure notice went out.
    Failed { notified: bool },
}

pub struct PollLoop<S, N, C = SystemClock> {
    source: S,
    notifier: N,
    clock: C,
    retry_interval: Duration,
    state: PollState,
}

impl<S, N, C> PollLoop<S, N, C>
where
    S: StatusSource,
    N: Notifier,
    C: Clock,
{
    pub fn new(source: S, notifier: N, clock: C, retry_interval: Duration, watermark: i64) -> Self {
        Self {
            source,
            notifier,
            clock,
            retry_interval,
            state: PollState::new(watermark),
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Poll forever, sleeping the retry interval after every cycle.
    ///
    /// Never returns; failures are reported and retried.
    pub async fn run(&mut self) {
        info!(
            watermark = self.state.watermark(),
            retry_secs = self.retry_interval.as_secs(),
            "poll loop started"
        );
        loop {
            let outcome = self.run_cycle().await;
            debug!(?outcome, watermark = self.state.watermark(), "cycle finished");
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Run one cycle without sleeping.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.deliver().await {
            Ok(outcome) => outcome,
            Err(err) => self.report_failure(err).await,
        }
    }

    async fn deliver(&mut self) -> Result<CycleOutcome, CycleError> {
        let answer = self.source.fetch(self.state.watermark()).await?;
        let record = validate(&answer)?;

        let (text, outcome) = match format(&record) {
            Ok(text) => (text, CycleOutcome::Delivered),
            Err(err @ FormatError::UnknownStatus { .. }) => {
                warn!(homework = %record.name, status = %record.status, "unknown review status");
                (err.notice(), CycleOutcome::DeliveredUnknown)
            }
        };

        self.notifier.send(&text).await?;
        info!(homework = %record.name, status = %record.status, "status change delivered");

        let next = answer.current_date.unwrap_or_else(|| self.clock.now());
        self.state.advance(next);
        Ok(outcome)
    }

    async fn report_failure(&mut self, err: CycleError) -> CycleOutcome {
        let text = format!("Failure: {err}");
        error!(error = %err, "poll cycle failed");

        if !self.state.remember_failure(&text) {
            debug!(message = %text, "failure already reported, not notifying again");
            return CycleOutcome::Failed { notified: false };
        }

        match self.notifier.send(&text).await {
            Ok(()) => CycleOutcome::Failed { notified: true },
            Err(send_err) => {
                error!(error = %send_err, "could not deliver failure notice");
                CycleOutcome::Failed { notified: false }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewbot_core::{Answer, HomeworkStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted fetch results and records the watermarks it was asked for.
    #[derive(Default)]
    struct ScriptedSource {
        replies: Mutex<VecDeque<Result<Answer, FetchError>>>,
        requested: Mutex<Vec<i64>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Result<Answer, FetchError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requested: Mutex::default(),
            }
        }

        fn requested(&self) -> Vec<i64> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self, from_date: i64) -> Result<Answer, FetchError> {
            self.requested.lock().unwrap().push(from_date);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Connection("script exhausted".into())))
        }
    }

    /// Records every message; optionally fails the first `fail_first` sends.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail_first: Mutex<usize>,
    }

    impl RecordingNotifier {
        fn failing(times: usize) -> Self {
            Self {
                sent: Mutex::default(),
                fail_first: Mutex::new(times),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            {
                let mut remaining = self.fail_first.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(NotifyError::Api {
                        status: 502,
                        description: "Bad Gateway".into(),
                    });
                }
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            self.0
        }
    }

    fn answer(json: &str) -> Answer {
        serde_json::from_str(json).unwrap()
    }

    fn status_answer(name: &str, status: &str, current_date: Option<i64>) -> Answer {
        let mut value = serde_json::json!({
            "homeworks": [{"homework_name": name, "status": status}],
        });
        if let Some(date) = current_date {
            value["current_date"] = date.into();
        }
        serde_json::from_value(value).unwrap()
    }

    fn poll_loop(
        replies: Vec<Result<Answer, FetchError>>,
        notifier: RecordingNotifier,
    ) -> PollLoop<ScriptedSource, RecordingNotifier, FixedClock> {
        PollLoop::new(
            ScriptedSource::new(replies),
            notifier,
            FixedClock(1_650_000_000),
            Duration::from_secs(600),
            1_600_000_000,
        )
    }

    #[tokio::test]
    async fn delivers_known_status() {
        let mut lp = poll_loop(
            vec![Ok(status_answer("hw05_final", "approved", Some(1_700_000_000)))],
            RecordingNotifier::default(),
        );

        assert_eq!(lp.run_cycle().await, CycleOutcome::Delivered);
        let sent = lp.notifier().sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("hw05_final"));
        assert!(sent[0].contains(HomeworkStatus::Approved.verdict()));
    }

    #[tokio::test]
    async fn server_date_becomes_next_watermark() {
        let mut lp = poll_loop(
            vec![
                Ok(status_answer("hw", "reviewing", Some(1_700_000_000))),
                Ok(status_answer("hw", "approved", None)),
            ],
            RecordingNotifier::default(),
        );

        lp.run_cycle().await;
        lp.run_cycle().await;
        assert_eq!(
            lp.source().requested(),
            vec![1_600_000_000, 1_700_000_000]
        );
    }

    #[tokio::test]
    async fn clock_time_becomes_watermark_without_server_date() {
        let mut lp = poll_loop(
            vec![Ok(status_answer("hw", "rejected", None))],
            RecordingNotifier::default(),
        );

        lp.run_cycle().await;
        lp.run_cycle().await;
        assert_eq!(lp.state().watermark(), 1_650_000_000);
        assert_eq!(
            lp.source().requested(),
            vec![1_600_000_000, 1_650_000_000]
        );
    }

    #[tokio::test]
    async fn unknown_status_is_degraded_not_failed() {
        let mut lp = poll_loop(
            vec![Ok(status_answer("hw03", "on_hold", Some(1_700_000_000)))],
            RecordingNotifier::default(),
        );

        assert_eq!(lp.run_cycle().await, CycleOutcome::DeliveredUnknown);
        assert_eq!(
            lp.notifier().sent(),
            vec!["Unknown review status \"on_hold\" received for work \"hw03\"".to_string()]
        );
        assert_eq!(lp.state().watermark(), 1_700_000_000);
        assert_eq!(lp.state().failures_sent(), 0);
    }

    #[tokio::test]
    async fn identical_failures_notify_once() {
        let mut lp = poll_loop(
            vec![
                Err(FetchError::Connection("connection refused".into())),
                Err(FetchError::Connection("connection refused".into())),
                Err(FetchError::Timeout(Duration::from_secs(5))),
            ],
            RecordingNotifier::default(),
        );

        assert_eq!(
            lp.run_cycle().await,
            CycleOutcome::Failed { notified: true }
        );
        assert_eq!(
            lp.run_cycle().await,
            CycleOutcome::Failed { notified: false }
        );
        assert_eq!(
            lp.run_cycle().await,
            CycleOutcome::Failed { notified: true }
        );

        let sent = lp.notifier().sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with("Failure: could not reach the status endpoint"));
        assert!(sent[1].starts_with("Failure: no response from the status endpoint"));
        assert_ne!(sent[0], sent[1]);
    }

    #[tokio::test]
    async fn failure_keeps_watermark() {
        let mut lp = poll_loop(
            vec![
                Ok(answer(r#"{"homeworks": [], "current_date": 1700000000}"#)),
                Ok(answer("{}")),
            ],
            RecordingNotifier::default(),
        );

        lp.run_cycle().await;
        lp.run_cycle().await;
        assert_eq!(lp.state().watermark(), 1_600_000_000);
        assert_eq!(
            lp.source().requested(),
            vec![1_600_000_000, 1_600_000_000]
        );
        assert_eq!(
            lp.notifier().sent(),
            vec![
                "Failure: \"homeworks\" is an empty list".to_string(),
                "Failure: response has no \"homeworks\" key".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn undelivered_status_is_retried() {
        // First send (the status message) fails, the failure notice goes out.
        let mut lp = poll_loop(
            vec![
                Ok(status_answer("hw", "approved", Some(1_700_000_000))),
                Ok(status_answer("hw", "approved", Some(1_700_000_000))),
            ],
            RecordingNotifier::failing(1),
        );

        assert_eq!(
            lp.run_cycle().await,
            CycleOutcome::Failed { notified: true }
        );
        assert_eq!(lp.state().watermark(), 1_600_000_000);
        assert_eq!(lp.run_cycle().await, CycleOutcome::Delivered);
        assert_eq!(lp.state().watermark(), 1_700_000_000);

        let sent = lp.notifier().sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with("Failure: chat API rejected the message"));
        assert!(sent[1].contains(HomeworkStatus::Approved.verdict()));
    }

    #[tokio::test]
    async fn failure_notice_that_cannot_be_sent_is_not_retried() {
        let mut lp = poll_loop(
            vec![
                Err(FetchError::Connection("down".into())),
                Err(FetchError::Connection("down".into())),
            ],
            RecordingNotifier::failing(1),
        );

        assert_eq!(
            lp.run_cycle().await,
            CycleOutcome::Failed { notified: false }
        );
        assert_eq!(
            lp.run_cycle().await,
            CycleOutcome::Failed { notified: false }
        );
        assert!(lp.notifier().sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_sleeps_retry_interval_between_cycles() {
        let mut lp = poll_loop(Vec::new(), RecordingNotifier::default());

        // Cycles start at t = 0, 600 and 1200 seconds.
        let stopped = tokio::time::timeout(Duration::from_secs(1250), lp.run()).await;
        assert!(stopped.is_err());
        assert_eq!(lp.source().requested().len(), 3);
        // The exhausted script fails identically every time: one notice.
        assert_eq!(lp.notifier().sent().len(), 1);
    }
}
