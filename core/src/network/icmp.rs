//! # ICMP Echo
//!
//! Native echo over a raw transport channel when the process may open one,
//! otherwise the system `ping` helper. Either way the result is a plain
//! `bool`; the caller enforces the overall deadline.

use std::net::{IpAddr, Ipv4Addr};
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::Context;
use lanwake_protocols::icmp::{self, EchoId};
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{self, TransportChannelType, TransportProtocol};
use tokio::process::Command;
use tracing::debug;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

pub async fn echo(ip: IpAddr, reply_timeout: Duration) -> bool {
    let attempt: anyhow::Result<bool> = match ip {
        IpAddr::V4(v4) if is_root::is_root() => native_echo(v4, reply_timeout).await,
        _ => system_ping(ip, reply_timeout).await,
    };

    attempt.unwrap_or_else(|e| {
        debug!(%ip, error = %e, "echo attempt failed");
        false
    })
}

async fn native_echo(ip: Ipv4Addr, reply_timeout: Duration) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || blocking_echo(ip, reply_timeout))
        .await
        .context("echo worker panicked")?
}

fn blocking_echo(ip: Ipv4Addr, reply_timeout: Duration) -> anyhow::Result<bool> {
    let (mut tx, mut rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("opening icmp channel")?;

    let id: EchoId = EchoId::random();
    let request: Vec<u8> = icmp::create_echo_request(id)?;
    let packet: IcmpPacket = IcmpPacket::new(&request).context("wrapping echo request")?;
    tx.send_to(packet, IpAddr::V4(ip)).context("sending echo request")?;

    let started: Instant = Instant::now();
    let mut replies = transport::icmp_packet_iter(&mut rx);
    loop {
        let remaining: Duration = reply_timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Ok(false);
        }
        match replies.next_with_timeout(remaining)? {
            Some((reply, source))
                if source == IpAddr::V4(ip) && icmp::is_echo_reply(reply.packet(), id) =>
            {
                return Ok(true);
            }
            // someone else's traffic
            Some(_) => continue,
            None => return Ok(false),
        }
    }
}

async fn system_ping(ip: IpAddr, reply_timeout: Duration) -> anyhow::Result<bool> {
    let wait_secs: u64 = reply_timeout.as_secs().max(1);
    let status = Command::new("ping")
        .arg("-c")
        .arg("1")
        .arg("-W")
        .arg(wait_secs.to_string())
        .arg(ip.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .context("spawning ping")?;

    Ok(status.success())
}
