use std::collections::HashMap;

use async_trait::async_trait;
use lanwake_common::config::{Config, ConfigError};
use lanwake_common::directory::DeviceDirectory;
use lanwake_common::network::host::HostTarget;
use lanwake_common::status::Verdict;

/// Fixed set of devices, typically built from the `[[devices]]` configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    hosts: Vec<HostTarget>,
    seeds: HashMap<String, Verdict>,
}

impl StaticDirectory {
    pub fn new(hosts: Vec<HostTarget>) -> Self {
        Self {
            hosts,
            seeds: HashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let seeds: HashMap<String, Verdict> = config
            .devices
            .iter()
            .filter_map(|d| d.last_status.map(|s| (d.id.clone(), s)))
            .collect();

        Ok(Self {
            hosts: config.targets()?,
            seeds,
        })
    }

    pub fn with_seed(mut self, host_id: impl Into<String>, status: Verdict) -> Self {
        self.seeds.insert(host_id.into(), status);
        self
    }
}

#[async_trait]
impl DeviceDirectory for StaticDirectory {
    async fn find(&self, host_id: &str) -> anyhow::Result<Option<HostTarget>> {
        Ok(self.hosts.iter().find(|h| h.id == host_id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<HostTarget>> {
        Ok(self.hosts.clone())
    }

    async fn last_status(&self, host_id: &str) -> anyhow::Result<Option<Verdict>> {
        Ok(self.seeds.get(host_id).copied())
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
