//! # Wake-on-LAN Magic Packet
//!
//! Six bytes of `0xFF` followed by the target's hardware address repeated
//! sixteen times. Pure and total for a valid address.

use lanwake_common::network::mac::{MAC_LEN, MacAddress, MacParseError};
use tracing::debug;

pub const SYNC_LEN: usize = 6;
pub const MAC_REPETITIONS: usize = 16;
pub const MAGIC_PACKET_LEN: usize = SYNC_LEN + MAC_LEN * MAC_REPETITIONS;

pub type MagicPacket = [u8; MAGIC_PACKET_LEN];

pub fn create_packet(mac: &MacAddress) -> MagicPacket {
    let mut packet: MagicPacket = [0xFF; MAGIC_PACKET_LEN];
    let octets: [u8; MAC_LEN] = mac.octets();
    for chunk in packet[SYNC_LEN..].chunks_exact_mut(MAC_LEN) {
        chunk.copy_from_slice(&octets);
    }

    debug!(mac = %mac, len = MAGIC_PACKET_LEN, "built magic packet");
    packet
}

/// Parses a colon- or hyphen-separated address and builds its packet.
pub fn encode(mac: &str) -> Result<MagicPacket, MacParseError> {
    let mac: MacAddress = mac.parse()?;
    Ok(create_packet(&mac))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
