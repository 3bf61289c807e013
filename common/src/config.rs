//! # Runtime Configuration
//!
//! Layered with `figment`: serialized defaults, then the TOML file, then
//! `LANWAKE_`-prefixed environment variables (`__` separates nesting, so
//! `LANWAKE_PROBE__TCP_TIMEOUT_MS=500` overrides `probe.tcp_timeout_ms`).

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::host::HostTarget;
use crate::status::{FAST_POLL_INTERVAL, SLOW_POLL_INTERVAL, Verdict};
use crate::wake::{
    DEFAULT_PORT, DEFAULT_REPEAT_COUNT, DEFAULT_REPEAT_INTERVAL_MS, WakeError, WakeSettings,
};

pub const DEFAULT_CONFIG_FILE: &str = "lanwake.toml";
pub const ENV_PREFIX: &str = "LANWAKE_";

/// Ports that commonly answer even when ICMP is filtered: SSH, HTTP, the SMB/RPC
/// family, RDP and alt-HTTP.
pub const DEFAULT_TCP_PORTS: [u16; 7] = [22, 80, 135, 139, 445, 3389, 8080];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("device '{id}': {source}")]
    Device {
        id: String,
        #[source]
        source: WakeError,
    },

    #[error("duplicate device id '{0}'")]
    DuplicateDevice(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeSection,
    pub stream: StreamSection,
    pub polling: PollingSection,
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSection {
    pub tcp_ports: Vec<u16>,
    pub tcp_timeout_ms: u64,
    /// Disables the echo probe entirely, leaving only TCP connects.
    pub icmp: bool,
    pub ping_timeout_ms: u64,
    /// Hard cap on one echo attempt, including helper process start-up.
    pub ping_deadline_ms: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            tcp_ports: DEFAULT_TCP_PORTS.to_vec(),
            tcp_timeout_ms: 1_000,
            icmp: true,
            ping_timeout_ms: 1_000,
            ping_deadline_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSection {
    pub status_period_secs: u64,
    pub heartbeat_period_secs: u64,
    pub resubscribe_backoff_secs: u64,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            status_period_secs: 30,
            heartbeat_period_secs: 25,
            resubscribe_backoff_secs: 5,
        }
    }
}

impl StreamSection {
    pub fn status_period(&self) -> Duration {
        Duration::from_secs(self.status_period_secs.max(1))
    }

    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_secs(self.heartbeat_period_secs.max(1))
    }

    pub fn resubscribe_backoff(&self) -> Duration {
        Duration::from_secs(self.resubscribe_backoff_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub fast_interval_ms: u64,
    pub slow_interval_ms: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            fast_interval_ms: whole_millis(FAST_POLL_INTERVAL),
            slow_interval_ms: whole_millis(SLOW_POLL_INTERVAL),
        }
    }
}

fn whole_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

impl PollingSection {
    pub fn fast_interval(&self) -> Duration {
        Duration::from_millis(self.fast_interval_ms)
    }

    pub fn slow_interval(&self) -> Duration {
        Duration::from_millis(self.slow_interval_ms)
    }
}

/// One `[[devices]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub mac: String,
    #[serde(default)]
    pub ip: Option<IpAddr>,
    #[serde(default = "default_broadcast")]
    pub broadcast: Ipv4Addr,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u8,
    #[serde(default = "default_repeat_interval_ms")]
    pub repeat_interval_ms: u64,
    /// Seeds the last-known status so the first check does not count as a transition.
    #[serde(default)]
    pub last_status: Option<Verdict>,
}

fn default_broadcast() -> Ipv4Addr {
    Ipv4Addr::BROADCAST
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_repeat_count() -> u8 {
    DEFAULT_REPEAT_COUNT
}

fn default_repeat_interval_ms() -> u64 {
    DEFAULT_REPEAT_INTERVAL_MS
}

impl DeviceEntry {
    pub fn to_target(&self) -> Result<HostTarget, ConfigError> {
        let wake: WakeSettings = WakeSettings::new(
            self.broadcast,
            self.port,
            self.repeat_count,
            self.repeat_interval_ms,
        )
        .map_err(|source| ConfigError::Device {
            id: self.id.clone(),
            source,
        })?;

        let mut target: HostTarget = HostTarget::new(&self.id, &self.mac).with_wake(wake);
        target.name = self.name.clone();
        target.ip = self.ip;
        Ok(target)
    }
}

impl Config {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] when no path is given.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file: PathBuf = match path {
            Some(p) if !p.exists() => return Err(ConfigError::Missing(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let figment: Figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        Ok(config)
    }

    /// Validates every device entry, rejecting duplicate ids.
    pub fn targets(&self) -> Result<Vec<HostTarget>, ConfigError> {
        let mut targets: Vec<HostTarget> = Vec::with_capacity(self.devices.len());
        for entry in &self.devices {
            if targets.iter().any(|t| t.id == entry.id) {
                return Err(ConfigError::DuplicateDevice(entry.id.clone()));
            }
            targets.push(entry.to_target()?);
        }
        Ok(targets)
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
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_should_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.probe.tcp_ports, vec![22, 80, 135, 139, 445, 3389, 8080]);
        assert_eq!(config.probe.tcp_timeout_ms, 1_000);
        assert_eq!(config.probe.ping_deadline_ms, 2_000);
        assert_eq!(config.stream.status_period(), Duration::from_secs(30));
        assert_eq!(config.stream.heartbeat_period(), Duration::from_secs(25));
        assert_eq!(config.stream.resubscribe_backoff(), Duration::from_secs(5));
        assert_eq!(config.polling.fast_interval(), Duration::from_secs(1));
        assert_eq!(config.polling.slow_interval(), Duration::from_secs(10));
        assert_eq!(config.polling.fast_interval(), FAST_POLL_INTERVAL);
        assert_eq!(config.polling.slow_interval(), SLOW_POLL_INTERVAL);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn load_should_merge_file_over_defaults() {
        let file = write_config(
            r#"
            [probe]
            tcp_ports = [22]
            icmp = false

            [[devices]]
            id = "desk"
            name = "Desk PC"
            mac = "AA:BB:CC:DD:EE:FF"
            ip = "192.168.0.20"
            broadcast = "192.168.0.255"
            repeat_count = 5
            last_status = "offline"

            [[devices]]
            id = "nas"
            mac = "00-11-22-33-44-55"
            "#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.probe.tcp_ports, vec![22]);
        assert!(!config.probe.icmp);
        assert_eq!(config.probe.tcp_timeout_ms, 1_000);
        assert_eq!(config.devices.len(), 2);

        let desk = &config.devices[0];
        assert_eq!(desk.last_status, Some(Verdict::Offline));
        assert_eq!(desk.port, 9);
        assert_eq!(desk.repeat_interval_ms, 500);

        let targets = config.targets().unwrap();
        assert_eq!(targets[0].display_name(), "Desk PC");
        assert_eq!(targets[0].wake.repeat_count(), 5);
        assert_eq!(targets[0].wake.broadcast(), Ipv4Addr::new(192, 168, 0, 255));
        assert_eq!(targets[1].ip, None);
        assert_eq!(targets[1].wake.broadcast(), Ipv4Addr::BROADCAST);
    }

    #[test]
    fn targets_should_name_device_with_out_of_range_settings() {
        let file = write_config(
            r#"
            [[devices]]
            id = "garage"
            mac = "AA:BB:CC:DD:EE:FF"
            repeat_interval_ms = 50
            "#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        let err = config.targets().unwrap_err();
        assert!(matches!(err, ConfigError::Device { ref id, .. } if id == "garage"));
    }

    #[test]
    fn targets_should_reject_duplicate_ids() {
        let entry = DeviceEntry {
            id: "desk".into(),
            name: None,
            mac: "AA:BB:CC:DD:EE:FF".into(),
            ip: None,
            broadcast: Ipv4Addr::BROADCAST,
            port: 9,
            repeat_count: 3,
            repeat_interval_ms: 500,
            last_status: None,
        };
        let config = Config {
            devices: vec![entry.clone(), entry],
            ..Config::default()
        };
        assert!(matches!(config.targets(), Err(ConfigError::DuplicateDevice(_))));
    }

    #[test]
    fn load_should_fail_for_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Missing(_))));
    }
}
