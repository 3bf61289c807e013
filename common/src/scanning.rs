//! Ports used by the reachability prober.
//!
//! [`ProbeTransport`] is the raw network seam (one echo, one connect);
//! [`Reachability`] is what the status layer depends on.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;

use crate::status::Verdict;

#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// One ICMP echo round trip. Any failure is `false`.
    async fn echo(&self, ip: IpAddr, timeout: Duration) -> bool;

    /// One TCP handshake, closed immediately. Any failure is `false`.
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> bool;
}

#[async_trait]
pub trait Reachability: Send + Sync {
    /// `None` short-circuits to [`Verdict::Unknown`] without touching the network.
    async fn evaluate(&self, ip: Option<IpAddr>) -> Verdict;
}
