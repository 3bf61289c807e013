use std::net::{IpAddr, Ipv6Addr};

use colored::*;
use lanwake_common::network::host::HostTarget;

use crate::terminal::colors;

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    let first_byte: u8 = ipv6_addr.octets()[0];
    if (0x20..=0x3F).contains(&first_byte) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

pub fn ip_to_key_value_pair(ip: &IpAddr) -> (String, ColoredString) {
    match ip {
        IpAddr::V4(ipv4_addr) => (
            String::from("IPv4"),
            ipv4_addr.to_string().color(colors::IPV4_ADDR),
        ),
        IpAddr::V6(ipv6_addr) => (
            String::from(ipv6_to_type_str(ipv6_addr)),
            ipv6_addr.to_string().color(colors::IPV6_ADDR),
        ),
    }
}

/// Detail rows for a device tree: address, MAC, vendor and wake destination.
pub fn host_to_key_value_pair(
    host: &HostTarget,
    vendor: Option<&str>,
) -> Vec<(String, ColoredString)> {
    let mut rows: Vec<(String, ColoredString)> = Vec::new();
    match &host.ip {
        Some(ip) => rows.push(ip_to_key_value_pair(ip)),
        None => rows.push((String::from("IP"), "not set".color(colors::UNKNOWN))),
    }
    rows.push((String::from("MAC"), host.mac.as_str().color(colors::MAC_ADDR)));
    if let Some(vendor) = vendor {
        rows.push((String::from("Vendor"), vendor.color(colors::TEXT_DEFAULT)));
    }
    rows.push((
        String::from("Wake"),
        format!(
            "{} x{} every {}ms",
            host.wake.destination(),
            host.wake.repeat_count(),
            host.wake.repeat_interval().as_millis()
        )
        .color(colors::SEPARATOR),
    ));
    rows
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
