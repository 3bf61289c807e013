//! # Reachability Probe
//!
//! Races one ICMP echo and a TCP connect per configured port against a
//! single host, collects every result, and OR-reduces them to a verdict.
//!
//! Probes run as futures joined in place rather than spawned tasks, so
//! dropping an evaluation drops every socket and helper process it owns.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, join_all};
use lanwake_common::config::{DEFAULT_TCP_PORTS, ProbeSection};
use lanwake_common::scanning::{ProbeTransport, Reachability};
use lanwake_common::status::{ProbeMethod, ProbeReport, ProbeResult, Verdict};
use tokio::time::{Instant, timeout};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub tcp_ports: Vec<u16>,
    pub tcp_timeout: Duration,
    pub icmp: bool,
    pub ping_timeout: Duration,
    /// Hard cutoff for the echo probe, including process start-up.
    pub ping_deadline: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            tcp_ports: DEFAULT_TCP_PORTS.to_vec(),
            tcp_timeout: Duration::from_secs(1),
            icmp: true,
            ping_timeout: Duration::from_secs(1),
            ping_deadline: Duration::from_secs(2),
        }
    }
}

impl From<&ProbeSection> for ProbeConfig {
    fn from(section: &ProbeSection) -> Self {
        Self {
            tcp_ports: section.tcp_ports.clone(),
            tcp_timeout: Duration::from_millis(section.tcp_timeout_ms),
            icmp: section.icmp,
            ping_timeout: Duration::from_millis(section.ping_timeout_ms),
            ping_deadline: Duration::from_millis(section.ping_deadline_ms),
        }
    }
}

pub struct ReachabilityProbe {
    transport: Arc<dyn ProbeTransport>,
    config: ProbeConfig,
}

impl ReachabilityProbe {
    pub fn new(transport: Arc<dyn ProbeTransport>, config: ProbeConfig) -> Self {
        Self { transport, config }
    }

    /// Runs every probe concurrently and returns each individual signal.
    pub async fn inspect(&self, ip: IpAddr) -> ProbeReport {
        let started: Instant = Instant::now();

        let mut probes: Vec<BoxFuture<'_, ProbeResult>> =
            Vec::with_capacity(self.config.tcp_ports.len() + 1);
        if self.config.icmp {
            probes.push(self.ping(ip).boxed());
        }
        for port in &self.config.tcp_ports {
            probes.push(self.connect(SocketAddr::new(ip, *port)).boxed());
        }

        let results: Vec<ProbeResult> = join_all(probes).await;
        let verdict: Verdict = Verdict::from_signals(results.iter().map(|r| r.success));
        let elapsed_ms: u64 = elapsed_ms(started);

        let detail: Vec<String> = results
            .iter()
            .map(|r| format!("{}={}", r.method, r.success))
            .collect();
        debug!(%ip, %verdict, elapsed_ms, detail = ?detail, "reachability evaluated");

        ProbeReport {
            ip,
            verdict,
            results,
            elapsed_ms,
        }
    }

    async fn ping(&self, ip: IpAddr) -> ProbeResult {
        let started: Instant = Instant::now();
        let echo = self.transport.echo(ip, self.config.ping_timeout);
        let success: bool = matches!(timeout(self.config.ping_deadline, echo).await, Ok(true));

        let elapsed_ms: u64 = elapsed_ms(started);
        let result = ProbeResult {
            method: ProbeMethod::Ping,
            success,
            elapsed_ms,
        };
        debug!(%ip, method = %result.method, success, elapsed_ms, "probe finished");
        result
    }

    async fn connect(&self, addr: SocketAddr) -> ProbeResult {
        let started: Instant = Instant::now();
        let attempt = self.transport.connect(addr, self.config.tcp_timeout);
        let success: bool = matches!(timeout(self.config.tcp_timeout, attempt).await, Ok(true));

        let elapsed_ms: u64 = elapsed_ms(started);
        let result = ProbeResult {
            method: ProbeMethod::Tcp(addr.port()),
            success,
            elapsed_ms,
        };
        debug!(ip = %addr.ip(), method = %result.method, success, elapsed_ms, "probe finished");
        result
    }
}

#[async_trait]
impl Reachability for ReachabilityProbe {
    async fn evaluate(&self, ip: Option<IpAddr>) -> Verdict {
        match ip {
            Some(ip) => self.inspect(ip).await.verdict,
            None => Verdict::Unknown,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
