//! # Wake-on-LAN Model
//!
//! Settings, outcomes, and errors shared by the dispatcher, the wake service,
//! and the [`ChangeSink`](crate::sink::ChangeSink) that records attempts.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::ops::RangeInclusive;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::mac::MacParseError;

pub const DEFAULT_PORT: u16 = 9;
pub const DEFAULT_REPEAT_COUNT: u8 = 3;
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 500;
pub const REPEAT_COUNT_RANGE: RangeInclusive<u8> = 1..=10;
pub const REPEAT_INTERVAL_MS_RANGE: RangeInclusive<u64> = 100..=5_000;

#[derive(Debug, Error)]
pub enum WakeError {
    /// The MAC address could not be encoded; nothing was sent.
    #[error("invalid MAC address: {0}")]
    InvalidMac(#[from] MacParseError),

    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// A single send failed; remaining repeats were abandoned.
    #[error("send {attempt}/{total} to {destination} failed: {source}")]
    Send {
        attempt: u8,
        total: u8,
        destination: SocketAddrV4,
        #[source]
        source: io::Error,
    },
}

impl WakeError {
    /// `true` when the request was rejected before any network action.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::InvalidMac(_) | Self::OutOfRange { .. })
    }
}

/// Where and how often the magic packet is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSettings {
    broadcast: Ipv4Addr,
    port: u16,
    repeat_count: u8,
    repeat_interval: Duration,
}

impl WakeSettings {
    /// Validates the repeat count (1–10), the interval (100–5000 ms) and the port (non-zero).
    pub fn new(
        broadcast: Ipv4Addr,
        port: u16,
        repeat_count: u8,
        repeat_interval_ms: u64,
    ) -> Result<Self, WakeError> {
        if port == 0 {
            return Err(WakeError::OutOfRange {
                field: "port",
                value: 0,
                min: 1,
                max: u64::from(u16::MAX),
            });
        }
        if !REPEAT_COUNT_RANGE.contains(&repeat_count) {
            return Err(WakeError::OutOfRange {
                field: "repeat_count",
                value: u64::from(repeat_count),
                min: u64::from(*REPEAT_COUNT_RANGE.start()),
                max: u64::from(*REPEAT_COUNT_RANGE.end()),
            });
        }
        if !REPEAT_INTERVAL_MS_RANGE.contains(&repeat_interval_ms) {
            return Err(WakeError::OutOfRange {
                field: "repeat_interval_ms",
                value: repeat_interval_ms,
                min: *REPEAT_INTERVAL_MS_RANGE.start(),
                max: *REPEAT_INTERVAL_MS_RANGE.end(),
            });
        }

        Ok(Self {
            broadcast,
            port,
            repeat_count,
            repeat_interval: Duration::from_millis(repeat_interval_ms),
        })
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.broadcast
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn repeat_count(&self) -> u8 {
        self.repeat_count
    }

    pub fn repeat_interval(&self) -> Duration {
        self.repeat_interval
    }

    pub fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast, self.port)
    }
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            broadcast: Ipv4Addr::BROADCAST,
            port: DEFAULT_PORT,
            repeat_count: DEFAULT_REPEAT_COUNT,
            repeat_interval: Duration::from_millis(DEFAULT_REPEAT_INTERVAL_MS),
        }
    }
}

/// Which side of the wake pipeline rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Bad MAC or settings; nothing was sent.
    Encoding,
    Transport,
}

/// Result of one wake invocation, as recorded by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum WakeOutcome {
    Success,
    Failure {
        #[serde(rename = "errorKind")]
        kind: FailureKind,
        #[serde(rename = "errorDetail")]
        detail: String,
    },
}

impl WakeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { detail, .. } => Some(detail),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<&WakeError> for FailureKind {
    fn from(error: &WakeError) -> Self {
        if error.is_encoding() {
            Self::Encoding
        } else {
            Self::Transport
        }
    }
}

impl From<&Result<(), WakeError>> for WakeOutcome {
    fn from(result: &Result<(), WakeError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => Self::Failure {
                kind: FailureKind::from(e),
                detail: e.to_string(),
            },
        }
    }
}

/// Caller-facing summary of a wake request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WakeReport {
    pub host_id: Option<String>,
    #[serde(flatten)]
    pub outcome: WakeOutcome,
    pub packets_sent: u8,
    pub elapsed_ms: u64,
    /// The history entry written for this request, when the sink kept one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<WakeAttempt>,
}

/// A persisted wake attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WakeAttempt {
    pub device_id: String,
    #[serde(flatten)]
    pub outcome: WakeOutcome,
    pub attempted_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
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

    #[test]
    fn settings_should_default_to_three_sends_half_a_second_apart() {
        let settings = WakeSettings::default();
        assert_eq!(settings.repeat_count(), 3);
        assert_eq!(settings.repeat_interval(), Duration::from_millis(500));
        assert_eq!(settings.destination(), SocketAddrV4::new(Ipv4Addr::BROADCAST, 9));
    }

    #[test]
    fn settings_should_enforce_ranges() {
        let bcast = Ipv4Addr::new(192, 168, 0, 255);
        assert!(WakeSettings::new(bcast, 9, 1, 100).is_ok());
        assert!(WakeSettings::new(bcast, 9, 10, 5_000).is_ok());

        let too_many = WakeSettings::new(bcast, 9, 11, 500).unwrap_err();
        assert!(matches!(too_many, WakeError::OutOfRange { field: "repeat_count", .. }));

        let zero = WakeSettings::new(bcast, 9, 0, 500).unwrap_err();
        assert!(matches!(zero, WakeError::OutOfRange { field: "repeat_count", .. }));

        let fast = WakeSettings::new(bcast, 9, 3, 99).unwrap_err();
        assert!(matches!(fast, WakeError::OutOfRange { field: "repeat_interval_ms", .. }));

        let port = WakeSettings::new(bcast, 0, 3, 500).unwrap_err();
        assert!(matches!(port, WakeError::OutOfRange { field: "port", .. }));
    }

    #[test]
    fn errors_should_distinguish_bad_mac_from_send_failure() {
        let bad_mac = WakeError::from(MacParseError::GroupCount(5));
        assert!(bad_mac.is_encoding());

        let send = WakeError::Send {
            attempt: 2,
            total: 3,
            destination: SocketAddrV4::new(Ipv4Addr::BROADCAST, 9),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!send.is_encoding());
        assert_eq!(send.to_string(), "send 2/3 to 255.255.255.255:9 failed: denied");
    }

    #[test]
    fn outcome_should_serialize_with_error_detail() {
        let failure = WakeOutcome::Failure {
            kind: FailureKind::Transport,
            detail: "network unreachable".into(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["errorKind"], "transport");
        assert_eq!(json["errorDetail"], "network unreachable");

        let success = serde_json::to_value(WakeOutcome::Success).unwrap();
        assert_eq!(success["outcome"], "success");
    }

    #[test]
    fn outcome_should_keep_failure_kind() {
        let bad_mac: Result<(), WakeError> = Err(WakeError::from(MacParseError::GroupCount(5)));
        let outcome = WakeOutcome::from(&bad_mac);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Encoding));

        let send: Result<(), WakeError> = Err(WakeError::Send {
            attempt: 1,
            total: 3,
            destination: SocketAddrV4::new(Ipv4Addr::BROADCAST, 9),
            source: io::Error::new(io::ErrorKind::NetworkUnreachable, "unreachable"),
        });
        assert_eq!(WakeOutcome::from(&send).failure_kind(), Some(FailureKind::Transport));
        assert_eq!(WakeOutcome::Success.failure_kind(), None);
    }
}
