//! In-process [`ChangeSink`] keeping status and wake history in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lanwake_common::sink::ChangeSink;
use lanwake_common::status::Verdict;
use lanwake_common::wake::{WakeAttempt, WakeOutcome};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct Ledger {
    statuses: HashMap<String, (Verdict, DateTime<Utc>)>,
    status_writes: usize,
    attempts: Vec<WakeAttempt>,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    ledger: Mutex<Ledger>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn status_of(&self, host_id: &str) -> Option<Verdict> {
        self.ledger.lock().await.statuses.get(host_id).map(|(s, _)| *s)
    }

    /// Number of `record_status` calls received so far.
    pub async fn status_writes(&self) -> usize {
        self.ledger.lock().await.status_writes
    }
}

#[async_trait]
impl ChangeSink for MemorySink {
    async fn record_status(&self, host_id: &str, status: Verdict) -> anyhow::Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut ledger = self.ledger.lock().await;
        ledger.statuses.insert(host_id.to_string(), (status, now));
        ledger.status_writes += 1;

        if status == Verdict::Online {
            let pending = ledger
                .attempts
                .iter_mut()
                .rev()
                .find(|a| a.device_id == host_id && a.outcome.is_success());
            if let Some(attempt) = pending.filter(|a| a.responded_at.is_none()) {
                attempt.responded_at = Some(now);
                debug!(host = %host_id, "wake attempt answered");
            }
        }
        Ok(())
    }

    async fn record_wake_attempt(
        &self,
        host_id: &str,
        outcome: &WakeOutcome,
    ) -> anyhow::Result<WakeAttempt> {
        let attempt: WakeAttempt = WakeAttempt {
            device_id: host_id.to_string(),
            outcome: outcome.clone(),
            attempted_at: Utc::now(),
            responded_at: None,
        };
        self.ledger.lock().await.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn wake_history(&self, host_id: &str) -> anyhow::Result<Vec<WakeAttempt>> {
        let ledger = self.ledger.lock().await;
        let history: Vec<WakeAttempt> = ledger
            .attempts
            .iter()
            .rev()
            .filter(|a| a.device_id == host_id)
            .cloned()
            .collect();
        Ok(history)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
