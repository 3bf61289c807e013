//! # Push Sessions
//!
//! One task per subscriber drives two timers: a status tick (first one fires
//! at once) and a heartbeat. Both live inside the same `select!` loop and
//! share one [`CancellationToken`], so teardown stops them together and
//! aborts any status batch still in flight.
//!
//! A tick that fires while the previous batch is still running is skipped.
//! A tick whose batch fails is skipped as well; the session carries on.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use lanwake_common::status::{StatusBatch, StreamEvent};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broadcaster::{HostSet, SessionTiming, StatusBroadcaster};

const EVENT_BUFFER: usize = 16;

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_subscriber_id() -> u64 {
    NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Polling,
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub id: u64,
    pub hosts: HostSet,
    pub mode: DeliveryMode,
    pub cadence: Duration,
}

/// Handle to a running push session.
///
/// Yields [`StreamEvent`]s until the session is closed. Dropping the handle
/// cancels the session.
pub struct Subscription {
    info: SubscriptionInfo,
    events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn info(&self) -> &SubscriptionInfo {
        &self.info
    }

    /// `None` once the session has ended and every buffered event was read.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Stops both timers. Events already buffered can still be read.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Closes the session and waits for its task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Stream for Subscription {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) fn open(broadcaster: StatusBroadcaster, hosts: HostSet) -> Subscription {
    let timing: SessionTiming = broadcaster.timing();
    let info = SubscriptionInfo {
        id: next_subscriber_id(),
        hosts: hosts.clone(),
        mode: DeliveryMode::Push,
        cadence: timing.status_period,
    };
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let cancel: CancellationToken = CancellationToken::new();

    let task: JoinHandle<()> = tokio::spawn(run(
        info.id,
        broadcaster,
        hosts,
        timing,
        tx,
        cancel.clone(),
    ));
    info!(subscriber = info.id, "push session opened");

    Subscription {
        info,
        events: rx,
        cancel,
        task: Some(task),
    }
}

async fn run(
    subscriber: u64,
    broadcaster: StatusBroadcaster,
    hosts: HostSet,
    timing: SessionTiming,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
) {
    let mut status_timer: Interval = time::interval(timing.status_period);
    status_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut heartbeat_timer: Interval = time::interval_at(
        Instant::now() + timing.heartbeat_period,
        timing.heartbeat_period,
    );
    heartbeat_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut inflight: JoinSet<anyhow::Result<StatusBatch>> = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            _ = tx.closed() => break,

            Some(joined) = inflight.join_next() => match joined {
                Ok(Ok(batch)) => {
                    if !emit(&tx, &cancel, StreamEvent::Status(batch)).await {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    warn!(subscriber, error = %e, "status tick failed; retrying next period")
                }
                Err(e) => warn!(subscriber, error = %e, "status tick aborted"),
            },

            _ = status_timer.tick() => {
                if !inflight.is_empty() {
                    debug!(subscriber, "previous status tick still running; skipped");
                    continue;
                }
                let broadcaster: StatusBroadcaster = broadcaster.clone();
                let hosts: HostSet = hosts.clone();
                inflight.spawn(async move { broadcaster.tick(&hosts).await });
            }

            _ = heartbeat_timer.tick() => {
                debug!(subscriber, "heartbeat");
                if !emit(&tx, &cancel, StreamEvent::heartbeat()).await {
                    break;
                }
            }
        }
    }

    inflight.abort_all();
    cancel.cancel();
    info!(subscriber, "push session closed");
}

/// `false` once the subscriber is gone or the session was cancelled.
async fn emit(
    tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    event: StreamEvent,
) -> bool {
    tokio::select! {
        sent = tx.send(event) => sent.is_ok(),
        _ = cancel.cancelled() => false,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::tests::{DESK, ScriptedReachability, broadcaster, hosts};
    use crate::directory::StaticDirectory;
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use futures::StreamExt;
    use lanwake_common::directory::DeviceDirectory;
    use lanwake_common::network::host::HostTarget;
    use lanwake_common::status::Verdict;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    /// Collects `(seconds since start, event name)` until `until` has passed.
    async fn collect_for(
        subscription: &mut Subscription,
        until: Duration,
    ) -> Vec<(u64, &'static str)> {
        let started = Instant::now();
        let deadline = started + until;
        let mut seen = Vec::new();
        while let Ok(Some(event)) = time::timeout_at(deadline, subscription.next_event()).await {
            seen.push((started.elapsed().as_secs(), event.name()));
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn session_should_emit_status_and_heartbeats_on_schedule() {
        let probe = Arc::new(ScriptedReachability::default());
        probe.set(DESK, Verdict::Online);
        let status = broadcaster(probe, Arc::new(MemorySink::new()), StaticDirectory::new(hosts()));

        let mut subscription = status.subscribe(HostSet::All);
        assert_eq!(subscription.info().mode, DeliveryMode::Push);
        assert_eq!(subscription.info().cadence, Duration::from_secs(30));

        let seen = collect_for(&mut subscription, Duration::from_secs(61)).await;
        assert_eq!(
            seen,
            vec![
                (0, "status"),
                (25, "heartbeat"),
                (30, "status"),
                (50, "heartbeat"),
                (60, "status"),
            ]
        );

        subscription.close();
        let after = time::timeout(Duration::from_secs(120), subscription.next_event()).await;
        assert!(matches!(after, Ok(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn session_should_send_full_batch_in_first_event() {
        let probe = Arc::new(ScriptedReachability::default());
        probe.set(DESK, Verdict::Online);
        let status = broadcaster(probe, Arc::new(MemorySink::new()), StaticDirectory::new(hosts()));

        let hosts = HostSet::Only(vec!["desk".into(), "printer".into()]);
        let mut subscription = status.subscribe(hosts);
        let Some(StreamEvent::Status(batch)) = subscription.next().await else {
            panic!("first event should be a status batch");
        };

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get("desk").unwrap().status, Verdict::Online);
        assert_eq!(batch.get("printer").unwrap().status, Verdict::Unknown);
        subscription.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn session_should_skip_overlapping_ticks() {
        let probe = Arc::new(ScriptedReachability::with_delay(Duration::from_secs(45)));
        let directory = StaticDirectory::new(hosts());
        let status = broadcaster(probe.clone(), Arc::new(MemorySink::new()), directory);

        let mut subscription = status.subscribe(HostSet::Only(vec!["desk".into()]));
        let seen = collect_for(&mut subscription, Duration::from_secs(100)).await;

        let statuses: Vec<u64> =
            seen.iter().filter(|(_, n)| *n == "status").map(|(t, _)| *t).collect();
        // ticks at 0 and 60 start batches; 30 and 90 land while one is running
        assert_eq!(statuses, vec![45]);
        assert_eq!(probe.evaluations.load(std::sync::atomic::Ordering::SeqCst), 2);
        subscription.shutdown().await;
    }

    /// Fails every other `list` call.
    struct FlakyDirectory {
        inner: StaticDirectory,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DeviceDirectory for FlakyDirectory {
        async fn find(&self, host_id: &str) -> anyhow::Result<Option<HostTarget>> {
            self.inner.find(host_id).await
        }

        async fn list(&self) -> anyhow::Result<Vec<HostTarget>> {
            if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) % 2 == 1 {
                anyhow::bail!("connection reset");
            }
            self.inner.list().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn session_should_survive_failed_tick() {
        let probe = Arc::new(ScriptedReachability::default());
        let directory = FlakyDirectory {
            inner: StaticDirectory::new(hosts()),
            calls: AtomicUsize::new(0),
        };
        let status = crate::broadcaster::StatusBroadcaster::new(
            probe,
            Arc::new(crate::store::StatusStore::new()),
            Arc::new(MemorySink::new()),
            Arc::new(directory),
        );

        let mut subscription = status.subscribe(HostSet::All);
        let seen = collect_for(&mut subscription, Duration::from_secs(61)).await;

        let statuses: Vec<u64> =
            seen.iter().filter(|(_, n)| *n == "status").map(|(t, _)| *t).collect();
        assert_eq!(statuses, vec![0, 60]);
        assert!(!subscription.is_closed());
        subscription.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_subscription_should_stop_session() {
        let probe = Arc::new(ScriptedReachability::default());
        let directory = StaticDirectory::new(hosts());
        let status = broadcaster(probe.clone(), Arc::new(MemorySink::new()), directory);

        let mut subscription = status.subscribe(HostSet::All);
        assert!(subscription.next_event().await.is_some());
        drop(subscription);

        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(probe.evaluations.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn subscriber_ids_should_be_unique() {
        let a = next_subscriber_id();
        let b = next_subscriber_id();
        assert_ne!(a, b);
    }
}
