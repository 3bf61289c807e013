//! Polling-mode subscription.
//!
//! The caller owns the cadence; [`Poller::tick`] just refuses to start a
//! second batch while one is outstanding and tells the caller how long to
//! wait before the next tick.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use lanwake_common::status::StatusBatch;
use tracing::debug;

use crate::broadcaster::{HostSet, StatusBroadcaster};
use crate::session::{DeliveryMode, SubscriptionInfo, next_subscriber_id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed { batch: StatusBatch, next_in: Duration },
    /// Another tick of this poller is still running.
    Skipped,
}

pub struct Poller {
    broadcaster: StatusBroadcaster,
    id: u64,
    hosts: HostSet,
    fast: Duration,
    slow: Duration,
    cadence_ms: AtomicU64,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Poller {
    pub(crate) fn new(
        broadcaster: StatusBroadcaster,
        hosts: HostSet,
        fast: Duration,
        slow: Duration,
    ) -> Self {
        Self {
            broadcaster,
            id: next_subscriber_id(),
            hosts,
            fast,
            slow,
            cadence_ms: AtomicU64::new(millis(fast)),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            id: self.id,
            hosts: self.hosts.clone(),
            mode: DeliveryMode::Polling,
            cadence: self.cadence(),
        }
    }

    /// Fast until the first batch without `unknown` members.
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms.load(Ordering::Acquire))
    }

    pub async fn tick(&self) -> anyhow::Result<PollOutcome> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!(subscriber = self.id, "poll already in flight; skipped");
            return Ok(PollOutcome::Skipped);
        }
        let _guard = InFlight(&self.in_flight);

        let batch: StatusBatch = self.broadcaster.check_set(&self.hosts).await?;
        let next_in: Duration = batch.recommended_interval(self.fast, self.slow);
        self.cadence_ms.store(millis(next_in), Ordering::Release);

        Ok(PollOutcome::Completed { batch, next_in })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
