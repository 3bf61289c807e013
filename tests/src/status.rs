#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use lanwake_common::network::host::HostTarget;
use lanwake_common::status::{StatusBatch, StreamEvent, Verdict};
use lanwake_core::broadcaster::{HostSet, StatusBroadcaster};
use lanwake_core::directory::StaticDirectory;
use lanwake_core::network::transport::NetProbeTransport;
use lanwake_core::probe::{ProbeConfig, ReachabilityProbe};
use lanwake_core::sink::MemorySink;
use lanwake_core::store::StatusStore;
use tokio::net::TcpListener;
use tokio::time::timeout;

fn broadcaster(port: u16, sink: Arc<MemorySink>) -> StatusBroadcaster {
    let probe = ReachabilityProbe::new(
        Arc::new(NetProbeTransport),
        ProbeConfig {
            tcp_ports: vec![port],
            tcp_timeout: Duration::from_millis(500),
            icmp: false,
            ..ProbeConfig::default()
        },
    );
    let directory = StaticDirectory::new(vec![
        HostTarget::new("local", "AA:BB:CC:DD:EE:FF").with_ip(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        HostTarget::new("printer", "11:22:33:44:55:66"),
    ]);
    StatusBroadcaster::new(
        Arc::new(probe),
        Arc::new(StatusStore::new()),
        sink,
        Arc::new(directory),
    )
}

/// A loopback listener drives a real transition through to the sink.
#[tokio::test]
async fn check_all_records_transition_once() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();
    let sink = Arc::new(MemorySink::new());
    let status = broadcaster(port, sink.clone());

    let first: StatusBatch = status.check_all().await.unwrap();
    assert_eq!(first.get("local").map(|s| (s.status, s.changed)), Some((Verdict::Online, true)));
    assert_eq!(
        first.get("printer").map(|s| (s.status, s.changed)),
        Some((Verdict::Unknown, false))
    );

    let second: StatusBatch = status.check_all().await.unwrap();
    assert_eq!(second.get("local").map(|s| s.changed), Some(false));

    assert_eq!(sink.status_of("local").await, Some(Verdict::Online));
    assert_eq!(sink.status_of("printer").await, None);
    assert_eq!(sink.status_writes().await, 1);
    drop(listener);
}

#[tokio::test]
async fn subscribe_pushes_first_batch_immediately() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();
    let status = broadcaster(port, Arc::new(MemorySink::new()));

    let mut subscription = status.subscribe(HostSet::All);
    let event = timeout(Duration::from_secs(5), subscription.next_event())
        .await
        .unwrap()
        .unwrap();

    let StreamEvent::Status(batch) = event else {
        panic!("first event should be a status batch");
    };
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.get("local").map(|s| s.status), Some(Verdict::Online));
    subscription.shutdown().await;
    drop(listener);
}
