use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use lanwake_common::scanning::ProbeTransport;

use crate::network::{icmp, tcp};

/// The real network behind [`ProbeTransport`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NetProbeTransport;

#[async_trait]
impl ProbeTransport for NetProbeTransport {
    async fn echo(&self, ip: IpAddr, timeout: Duration) -> bool {
        icmp::echo(ip, timeout).await
    }

    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> bool {
        tcp::handshake_probe(addr, timeout).await
    }
}
