use std::net::IpAddr;

use crate::wake::WakeSettings;

/// A device the core can probe and wake.
///
/// Supplied by a [`DeviceDirectory`](crate::directory::DeviceDirectory) per
/// invocation; the core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub id: String,
    pub name: Option<String>,
    /// Hosts without an address are never probed and always read as `unknown`.
    pub ip: Option<IpAddr>,
    /// Kept as typed; encoding happens when a wake is dispatched.
    pub mac: String,
    pub wake: WakeSettings,
}

impl HostTarget {
    pub fn new(id: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            ip: None,
            mac: mac.into(),
            wake: WakeSettings::default(),
        }
    }

    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_wake(mut self, wake: WakeSettings) -> Self {
        self.wake = wake;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
