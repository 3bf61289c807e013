#![cfg(test)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use lanwake_common::wake::{WakeReport, WakeSettings};
use lanwake_core::network::udp::UdpBroadcastSender;
use lanwake_core::wake::WakeDispatcher;
use lanwake_protocols::magic::{self, MAGIC_PACKET_LEN};
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

/// The dispatcher should deliver `repeat_count` identical magic packets,
/// spaced by the repeat interval.
#[tokio::test]
async fn wake_loopback_delivers_spaced_packets() {
    let listener: UdpSocket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();

    let receiver = tokio::spawn(async move {
        let mut received: Vec<(Instant, Vec<u8>)> = Vec::new();
        let mut buf = [0u8; 512];
        while received.len() < 3 {
            let (len, _from): (usize, SocketAddr) =
                timeout(Duration::from_secs(5), listener.recv_from(&mut buf))
                    .await
                    .expect("packet within five seconds")
                    .unwrap();
            received.push((Instant::now(), buf[..len].to_vec()));
        }
        received
    });

    let settings: WakeSettings = WakeSettings::new(Ipv4Addr::LOCALHOST, port, 3, 500).unwrap();
    let dispatcher: WakeDispatcher = WakeDispatcher::new(Arc::new(UdpBroadcastSender));
    let report: WakeReport = dispatcher.wake("AA:BB:CC:DD:EE:FF", &settings).await;

    assert!(report.outcome.is_success(), "wake failed: {:?}", report.outcome.detail());
    assert_eq!(report.packets_sent, 3);
    assert!(report.elapsed_ms >= 1_000);

    let received = receiver.await.unwrap();
    let expected = magic::encode("AA:BB:CC:DD:EE:FF").unwrap();
    for (_, payload) in &received {
        assert_eq!(payload.len(), MAGIC_PACKET_LEN);
        assert_eq!(payload.as_slice(), expected.as_slice());
    }
    // Receive timestamps carry scheduler jitter on top of the send spacing.
    assert!(received[1].0 - received[0].0 >= Duration::from_millis(400));
    assert!(received[2].0 - received[1].0 >= Duration::from_millis(400));
}

#[tokio::test]
async fn wake_rejects_malformed_mac_without_sending() {
    let dispatcher: WakeDispatcher = WakeDispatcher::new(Arc::new(UdpBroadcastSender));
    let settings: WakeSettings = WakeSettings::new(Ipv4Addr::LOCALHOST, 9, 1, 100).unwrap();

    let err = dispatcher.send("not-a-mac", &settings).await.unwrap_err();
    assert!(err.is_encoding());
}
