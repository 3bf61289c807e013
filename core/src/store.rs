//! Last-known status per host.
//!
//! Each entry is updated with a read-modify-write under the map's shard lock,
//! so two concurrent checks of the same host cannot both report a transition.
//! Callers that persist a transition hold the host's [`write_guard`] from
//! `observe` until the write (or its rollback) is done, which keeps the sink
//! in the same order as the store.
//!
//! [`write_guard`]: StatusStore::write_guard

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lanwake_common::status::Verdict;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: Verdict,
    /// `None` until the host has been probed at least once.
    pub checked_at: Option<DateTime<Utc>>,
}

/// A status change that was applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub before: Option<Verdict>,
    pub after: Verdict,
}

#[derive(Debug, Default)]
pub struct StatusStore {
    records: DashMap<String, StatusRecord>,
    writers: DashMap<String, Arc<Mutex<()>>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes observe-and-persist for one host. Other hosts are not blocked.
    pub async fn write_guard(&self, host_id: &str) -> OwnedMutexGuard<()> {
        let gate: Arc<Mutex<()>> = self
            .writers
            .entry(host_id.to_string())
            .or_default()
            .clone();
        gate.lock_owned().await
    }

    /// Inserts a previously persisted status unless the host is already tracked.
    pub fn seed(&self, host_id: &str, status: Verdict) {
        self.records
            .entry(host_id.to_string())
            .or_insert(StatusRecord {
                status,
                checked_at: None,
            });
    }

    /// Records a fresh probe result. Always refreshes `checked_at`; returns the
    /// transition only when the status actually differs from the stored one.
    pub fn observe(&self, host_id: &str, status: Verdict, at: DateTime<Utc>) -> Option<Transition> {
        match self.records.entry(host_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let record: &mut StatusRecord = entry.get_mut();
                record.checked_at = Some(at);
                if record.status == status {
                    return None;
                }
                let before: Verdict = record.status;
                record.status = status;
                Some(Transition {
                    before: Some(before),
                    after: status,
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(StatusRecord {
                    status,
                    checked_at: Some(at),
                });
                Some(Transition {
                    before: None,
                    after: status,
                })
            }
        }
    }

    /// Undoes `transition` if nothing has moved the host on since.
    pub fn rollback(&self, host_id: &str, transition: &Transition) {
        if let Entry::Occupied(mut entry) = self.records.entry(host_id.to_string()) {
            if entry.get().status != transition.after {
                return;
            }
            match transition.before {
                Some(before) => entry.get_mut().status = before,
                None => {
                    entry.remove();
                }
            }
        }
    }

    pub fn last_known(&self, host_id: &str) -> Option<StatusRecord> {
        self.records.get(host_id).map(|r| *r)
    }

    pub fn contains(&self, host_id: &str) -> bool {
        self.records.contains_key(host_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
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
    use chrono::Duration;

    #[test]
    fn observe_should_report_first_sighting_and_changes_only() {
        let store = StatusStore::new();
        let t0 = Utc::now();

        let first = store.observe("desk", Verdict::Online, t0);
        assert_eq!(
            first,
            Some(Transition {
                before: None,
                after: Verdict::Online
            })
        );
        assert_eq!(store.observe("desk", Verdict::Online, t0), None);

        let flip = store.observe("desk", Verdict::Offline, t0);
        assert_eq!(flip.map(|t| t.before), Some(Some(Verdict::Online)));
    }

    #[test]
    fn observe_should_refresh_checked_at_without_change() {
        let store = StatusStore::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(30);

        store.observe("nas", Verdict::Offline, t0);
        assert_eq!(store.observe("nas", Verdict::Offline, t1), None);
        assert_eq!(store.last_known("nas").unwrap().checked_at, Some(t1));
    }

    #[test]
    fn seed_should_not_count_as_transition_when_reaffirmed() {
        let store = StatusStore::new();
        store.seed("desk", Verdict::Online);
        assert_eq!(store.last_known("desk").unwrap().checked_at, None);

        assert_eq!(store.observe("desk", Verdict::Online, Utc::now()), None);

        store.seed("desk", Verdict::Offline);
        assert_eq!(store.last_known("desk").unwrap().status, Verdict::Online);
    }

    #[test]
    fn rollback_should_restore_previous_status() {
        let store = StatusStore::new();
        store.seed("desk", Verdict::Offline);
        let transition = store.observe("desk", Verdict::Online, Utc::now()).unwrap();

        store.rollback("desk", &transition);
        assert_eq!(store.last_known("desk").unwrap().status, Verdict::Offline);

        let fresh = store.observe("nas", Verdict::Online, Utc::now()).unwrap();
        store.rollback("nas", &fresh);
        assert!(!store.contains("nas"));
    }

    #[tokio::test(start_paused = true)]
    async fn write_guard_should_serialize_same_host_only() {
        let store = std::sync::Arc::new(StatusStore::new());
        let held = store.write_guard("desk").await;

        let other = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            store.write_guard("nas"),
        )
        .await;
        assert!(other.is_ok());

        let waiting = tokio::spawn({
            let store = store.clone();
            async move {
                let _guard = store.write_guard("desk").await;
            }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(held);
        waiting.await.unwrap();
    }

    #[test]
    fn rollback_should_leave_newer_transitions_alone() {
        let store = StatusStore::new();
        store.seed("desk", Verdict::Offline);
        let stale = store.observe("desk", Verdict::Online, Utc::now()).unwrap();
        store.observe("desk", Verdict::Offline, Utc::now());
        store.observe("desk", Verdict::Unknown, Utc::now());

        store.rollback("desk", &stale);
        assert_eq!(store.last_known("desk").unwrap().status, Verdict::Unknown);
    }
}
