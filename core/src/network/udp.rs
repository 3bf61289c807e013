use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;
use lanwake_common::sending::PacketSender;
use tokio::net::UdpSocket;

/// Sends each datagram from a freshly bound, broadcast-enabled socket that is
/// closed again before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpBroadcastSender;

#[async_trait]
impl PacketSender for UdpBroadcastSender {
    async fn send_broadcast(&self, packet: &[u8], destination: SocketAddrV4) -> io::Result<()> {
        let socket: UdpSocket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;

        let sent: usize = socket.send_to(packet, destination).await?;
        if sent != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short send: {sent} of {} bytes", packet.len()),
            ));
        }
        Ok(())
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
