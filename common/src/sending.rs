use std::io;
use std::net::SocketAddrV4;

use async_trait::async_trait;

/// Outbound port for putting a single datagram onto the local segment.
///
/// Implementations must not reuse endpoints between calls.
#[async_trait]
pub trait PacketSender: Send + Sync {
    async fn send_broadcast(&self, packet: &[u8], destination: SocketAddrV4) -> io::Result<()>;
}
