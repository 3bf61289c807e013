//! Outbound port for recording state transitions and wake attempts.
//!
//! The core calls into the sink only when something happened: a status that
//! differs from the last known one, or a finished wake invocation.

use async_trait::async_trait;

use crate::status::Verdict;
use crate::wake::{WakeAttempt, WakeOutcome};

#[async_trait]
pub trait ChangeSink: Send + Sync {
    /// Durably records a status transition. Never called with an unchanged status.
    async fn record_status(&self, host_id: &str, status: Verdict) -> anyhow::Result<()>;

    /// Records one wake invocation, successful or not, and returns the stored entry.
    async fn record_wake_attempt(
        &self,
        host_id: &str,
        outcome: &WakeOutcome,
    ) -> anyhow::Result<WakeAttempt>;

    /// Wake attempts for `host_id`, newest first.
    async fn wake_history(&self, host_id: &str) -> anyhow::Result<Vec<WakeAttempt>>;
}
