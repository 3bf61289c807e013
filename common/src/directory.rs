use async_trait::async_trait;
use thiserror::Error;

use crate::network::host::HostTarget;
use crate::status::Verdict;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("device directory unavailable: {0}")]
    Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Outbound port resolving device identifiers to their probe/wake configuration.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn find(&self, host_id: &str) -> anyhow::Result<Option<HostTarget>>;

    /// Every device the caller may observe.
    async fn list(&self) -> anyhow::Result<Vec<HostTarget>>;

    /// The last status the directory's backing store knows about, if any.
    async fn last_status(&self, _host_id: &str) -> anyhow::Result<Option<Verdict>> {
        Ok(None)
    }

    async fn require(&self, host_id: &str) -> Result<HostTarget, LookupError> {
        self.find(host_id)
            .await
            .map_err(|e| LookupError::Directory(e.into()))?
            .ok_or_else(|| LookupError::NotFound(host_id.to_string()))
    }
}
