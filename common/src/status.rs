//! # Reachability Model
//!
//! Verdicts, per-probe results, and the events handed to status observers.
//!
//! A [`Verdict::Unknown`] only ever describes a host without an IP address;
//! probing always resolves to [`Verdict::Online`] or [`Verdict::Offline`].

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FAST_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const SLOW_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl Verdict {
    /// OR-reduction over probe signals: one success is enough.
    pub fn from_signals(signals: impl IntoIterator<Item = bool>) -> Self {
        if signals.into_iter().any(|up| up) {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The liveness check a [`ProbeResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
    Ping,
    Tcp(u16),
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ping => f.write_str("ping"),
            Self::Tcp(port) => write!(f, "tcp:{port}"),
        }
    }
}

impl Serialize for ProbeMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One probe's signal. Lives only for the duration of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub method: ProbeMethod,
    pub success: bool,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
}

/// Full detail of one host evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub ip: IpAddr,
    pub verdict: Verdict,
    pub results: Vec<ProbeResult>,
    pub elapsed_ms: u64,
}

impl ProbeReport {
    pub fn successes(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.success)
    }
}

/// A freshly checked status for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStatus {
    pub host_id: String,
    pub status: Verdict,
    pub checked_at: DateTime<Utc>,
    /// `true` only when this check moved the host to a different status.
    pub changed: bool,
}

/// Statuses produced by one tick, in the order the hosts were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusBatch(pub Vec<HostStatus>);

impl StatusBatch {
    pub fn has_unknown(&self) -> bool {
        self.0.iter().any(|s| s.status == Verdict::Unknown)
    }

    /// Polling cadence a caller should use next: fast while anything is
    /// unresolved, slow once every host has a verdict.
    pub fn recommended_interval(&self, fast: Duration, slow: Duration) -> Duration {
        if self.has_unknown() { fast } else { slow }
    }

    pub fn get(&self, host_id: &str) -> Option<&HostStatus> {
        self.0.iter().find(|s| s.host_id == host_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostStatus> {
        self.0.iter()
    }
}

impl FromIterator<HostStatus> for StatusBatch {
    fn from_iter<I: IntoIterator<Item = HostStatus>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Empty {}

/// Envelope pushed to stream subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "lowercase")]
pub enum StreamEvent {
    Status(StatusBatch),
    Heartbeat(Empty),
}

impl StreamEvent {
    pub fn heartbeat() -> Self {
        Self::Heartbeat(Empty {})
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Heartbeat(_) => "heartbeat",
        }
    }

    /// Serialized payload only, as carried in an SSE `data:` line.
    pub fn payload_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Status(batch) => serde_json::to_string(batch),
            Self::Heartbeat(empty) => serde_json::to_string(empty),
        }
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
