//! # Status Broadcaster
//!
//! The probe-and-diff core shared by both delivery models:
//!
//! * **polling**: [`check_one`](StatusBroadcaster::check_one),
//!   [`check_all`](StatusBroadcaster::check_all) and friends return the
//!   verdicts to the caller. The work runs on a detached task, so a caller
//!   that goes away does not cancel probes already on the wire.
//! * **push**: [`subscribe`](StatusBroadcaster::subscribe) opens a session
//!   that ticks on its own timer (see [`crate::session`]).
//!
//! A status is persisted through the [`ChangeSink`] only when it differs
//! from the last known one. Hosts without an address are reported as
//! `unknown` and never diffed.

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use lanwake_common::config::{PollingSection, StreamSection};
use lanwake_common::directory::DeviceDirectory;
use lanwake_common::network::host::HostTarget;
use lanwake_common::scanning::Reachability;
use lanwake_common::sink::ChangeSink;
use lanwake_common::status::{HostStatus, StatusBatch, Verdict};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::poller::Poller;
use crate::session::{self, Subscription};
use crate::store::{StatusStore, Transition};

/// Timer periods of a push session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub status_period: Duration,
    pub heartbeat_period: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            status_period: Duration::from_secs(30),
            heartbeat_period: Duration::from_secs(25),
        }
    }
}

impl From<&StreamSection> for SessionTiming {
    fn from(section: &StreamSection) -> Self {
        Self {
            status_period: section.status_period(),
            heartbeat_period: section.heartbeat_period(),
        }
    }
}

/// Which hosts a subscription or batch covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSet {
    /// Everything the directory lists, re-read on every tick.
    All,
    Only(Vec<String>),
}

/// Result of probing a bare address, outside any device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSnapshot {
    pub status: Verdict,
    pub checked_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct StatusBroadcaster {
    probe: Arc<dyn Reachability>,
    store: Arc<StatusStore>,
    sink: Arc<dyn ChangeSink>,
    directory: Arc<dyn DeviceDirectory>,
    timing: SessionTiming,
}

impl StatusBroadcaster {
    pub fn new(
        probe: Arc<dyn Reachability>,
        store: Arc<StatusStore>,
        sink: Arc<dyn ChangeSink>,
        directory: Arc<dyn DeviceDirectory>,
    ) -> Self {
        Self {
            probe,
            store,
            sink,
            directory,
            timing: SessionTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> SessionTiming {
        self.timing
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Probes an address without touching any stored status.
    pub async fn probe_one(&self, ip: Option<IpAddr>) -> ProbeSnapshot {
        let status: Verdict = self.probe.evaluate(ip).await;
        ProbeSnapshot {
            status,
            checked_at: Utc::now(),
        }
    }

    /// Looks the device up and checks it. Fails with a
    /// [`LookupError`](lanwake_common::directory::LookupError) for unknown ids.
    pub async fn check_one(&self, host_id: &str) -> anyhow::Result<HostStatus> {
        let target: HostTarget = self.directory.require(host_id).await?;
        self.check_host(target).await
    }

    pub async fn check_host(&self, target: HostTarget) -> anyhow::Result<HostStatus> {
        let this: StatusBroadcaster = self.clone();
        detached(async move { this.refresh(&target).await }).await
    }

    /// Checks `targets` concurrently; the batch keeps their order.
    pub async fn check_batch(&self, targets: Vec<HostTarget>) -> anyhow::Result<StatusBatch> {
        let this: StatusBroadcaster = self.clone();
        detached(async move { this.run_batch(&targets).await }).await
    }

    pub async fn check_all(&self) -> anyhow::Result<StatusBatch> {
        self.check_set(&HostSet::All).await
    }

    pub async fn check_set(&self, hosts: &HostSet) -> anyhow::Result<StatusBatch> {
        let this: StatusBroadcaster = self.clone();
        let hosts: HostSet = hosts.clone();
        detached(async move { this.tick(&hosts).await }).await?
    }

    /// Opens a push session over `hosts`. Dropping the subscription ends it.
    pub fn subscribe(&self, hosts: HostSet) -> Subscription {
        session::open(self.clone(), hosts)
    }

    /// A caller-driven subscription with an in-flight guard and adaptive cadence.
    pub fn poller(&self, hosts: HostSet, polling: &PollingSection) -> Poller {
        Poller::new(self.clone(), hosts, polling.fast_interval(), polling.slow_interval())
    }

    /// One probe-and-diff pass, run in the caller's task.
    pub(crate) async fn tick(&self, hosts: &HostSet) -> anyhow::Result<StatusBatch> {
        let targets: Vec<HostTarget> = self.resolve(hosts).await?;
        Ok(self.run_batch(&targets).await)
    }

    async fn resolve(&self, hosts: &HostSet) -> anyhow::Result<Vec<HostTarget>> {
        match hosts {
            HostSet::All => self.directory.list().await.context("listing devices"),
            HostSet::Only(ids) => {
                let mut targets: Vec<HostTarget> = Vec::with_capacity(ids.len());
                for id in ids {
                    match self.directory.find(id).await.context("looking up device")? {
                        Some(target) => targets.push(target),
                        None => warn!(host = %id, "device no longer exists; skipping"),
                    }
                }
                Ok(targets)
            }
        }
    }

    async fn run_batch(&self, targets: &[HostTarget]) -> StatusBatch {
        join_all(targets.iter().map(|t| self.refresh(t)))
            .await
            .into_iter()
            .collect()
    }

    async fn refresh(&self, target: &HostTarget) -> HostStatus {
        let status: Verdict = self.probe.evaluate(target.ip).await;
        let checked_at: DateTime<Utc> = Utc::now();

        if status == Verdict::Unknown {
            return HostStatus {
                host_id: target.id.clone(),
                status,
                checked_at,
                changed: false,
            };
        }

        let _writer = self.store.write_guard(&target.id).await;
        self.seed_from_directory(&target.id).await;
        let changed: bool = match self.store.observe(&target.id, status, checked_at) {
            Some(transition) => self.persist(target, transition).await,
            None => false,
        };

        HostStatus {
            host_id: target.id.clone(),
            status,
            checked_at,
            changed,
        }
    }

    async fn seed_from_directory(&self, host_id: &str) {
        if self.store.contains(host_id) {
            return;
        }
        match self.directory.last_status(host_id).await {
            Ok(Some(status)) => self.store.seed(host_id, status),
            Ok(None) => {}
            Err(e) => debug!(host = %host_id, error = %e, "no stored status available"),
        }
    }

    /// Returns whether the transition stuck. A failed write is rolled back so
    /// the next check tries again.
    async fn persist(&self, target: &HostTarget, transition: Transition) -> bool {
        match self.sink.record_status(&target.id, transition.after).await {
            Ok(()) => {
                info!(
                    host = %target.id,
                    name = %target.display_name(),
                    ip = ?target.ip,
                    before = ?transition.before,
                    after = %transition.after,
                    "device status changed"
                );
                true
            }
            Err(e) => {
                warn!(host = %target.id, error = %e, "failed to record status change");
                self.store.rollback(&target.id, &transition);
                false
            }
        }
    }
}

async fn detached<F, T>(work: F) -> anyhow::Result<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await.context("status check task failed")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
