#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use lanwake_common::status::{ProbeMethod, ProbeReport, Verdict};
use lanwake_core::network::transport::NetProbeTransport;
use lanwake_core::probe::{ProbeConfig, ReachabilityProbe};
use tokio::net::TcpListener;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn tcp_only(ports: Vec<u16>) -> ProbeConfig {
    ProbeConfig {
        tcp_ports: ports,
        tcp_timeout: Duration::from_millis(500),
        icmp: false,
        ..ProbeConfig::default()
    }
}

async fn closed_port() -> u16 {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// One listening port among closed ones is enough for `online`.
#[tokio::test]
async fn probe_open_listener_rescues_verdict() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open: u16 = listener.local_addr().unwrap().port();
    let closed: u16 = closed_port().await;

    let probe = ReachabilityProbe::new(Arc::new(NetProbeTransport), tcp_only(vec![closed, open]));
    let report: ProbeReport = probe.inspect(LOCALHOST).await;

    assert_eq!(report.verdict, Verdict::Online);
    assert_eq!(report.results.len(), 2);
    let hits: Vec<ProbeMethod> = report.successes().map(|r| r.method).collect();
    assert_eq!(hits, vec![ProbeMethod::Tcp(open)]);
    drop(listener);
}

#[tokio::test]
async fn probe_refused_ports_read_offline() {
    let closed: u16 = closed_port().await;

    let probe = ReachabilityProbe::new(Arc::new(NetProbeTransport), tcp_only(vec![closed]));
    let report: ProbeReport = probe.inspect(LOCALHOST).await;

    assert_eq!(report.verdict, Verdict::Offline);
    assert!(report.successes().next().is_none());
}
