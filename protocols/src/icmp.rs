//! ICMPv4 echo request builder and reply matcher for the native ping probe.

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};

pub const ICMP_ECHO_HDR_LEN: usize = 8;
pub const ECHO_PAYLOAD: &[u8; 16] = b"lanwake-liveness";
pub const ECHO_REQUEST_LEN: usize = ICMP_ECHO_HDR_LEN + ECHO_PAYLOAD.len();

/// Identifier and sequence number pairing a request with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoId {
    pub identifier: u16,
    pub sequence: u16,
}

impl EchoId {
    pub fn random() -> Self {
        Self {
            identifier: rand::random(),
            sequence: rand::random(),
        }
    }
}

pub fn create_echo_request(id: EchoId) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_REQUEST_LEN];
    {
        let mut echo: MutableEchoRequestPacket =
            MutableEchoRequestPacket::new(&mut buffer).context("creating echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(id.identifier);
        echo.set_sequence_number(id.sequence);
        echo.set_payload(ECHO_PAYLOAD);
        echo.set_checksum(0);
    }

    let csum: u16 = {
        let view: IcmpPacket = IcmpPacket::new(&buffer).context("reading echo request")?;
        icmp::checksum(&view)
    };
    let mut echo: MutableEchoRequestPacket =
        MutableEchoRequestPacket::new(&mut buffer).context("finalizing echo request")?;
    echo.set_checksum(csum);

    Ok(buffer)
}

/// `true` when `bytes` (an ICMP message without its IP header) answers `id`.
pub fn is_echo_reply(bytes: &[u8], id: EchoId) -> bool {
    let Some(message) = IcmpPacket::new(bytes) else {
        return false;
    };
    if message.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }

    EchoReplyPacket::new(message.packet()).is_some_and(|reply| {
        reply.get_identifier() == id.identifier && reply.get_sequence_number() == id.sequence
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
