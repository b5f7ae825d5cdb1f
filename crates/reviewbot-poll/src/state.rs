//! Watermark and already-reported failures, carried between cycles.

use std::collections::HashSet;

/// Everything the loop remembers between cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    watermark: i64,
    /// Failure texts already sent this run. Never evicted.
    sent_failures: HashSet<String>,
}

impl PollState {
    pub fn new(watermark: i64) -> Self {
        Self {
            watermark,
            sent_failures: HashSet::new(),
        }
    }

    /// Lower bound (Unix seconds) for the next status request.
    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub(crate) fn advance(&mut self, to: i64) {
        self.watermark = to;
    }

    /// Record a failure text. Returns `false` if it was already recorded.
    pub(crate) fn remember_failure(&mut self, text: &str) -> bool {
        self.sent_failures.insert(text.to_owned())
    }

    pub fn failures_sent(&self) -> usize {
        self.sent_failures.len()
    }
}
