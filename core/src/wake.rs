//! # Wake Dispatch
//!
//! [`WakeDispatcher`] puts the magic packet on the wire `repeat_count` times;
//! [`WakeService`] wraps it with device lookup and attempt recording.

use std::sync::Arc;

use lanwake_common::directory::{DeviceDirectory, LookupError};
use lanwake_common::network::host::HostTarget;
use lanwake_common::sending::PacketSender;
use lanwake_common::sink::ChangeSink;
use lanwake_common::wake::{WakeAttempt, WakeError, WakeOutcome, WakeReport, WakeSettings};
use lanwake_protocols::magic::{self, MagicPacket};
use tokio::time::{Instant, sleep};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct WakeDispatcher {
    sender: Arc<dyn PacketSender>,
}

impl WakeDispatcher {
    pub fn new(sender: Arc<dyn PacketSender>) -> Self {
        Self { sender }
    }

    /// Encodes once, then sends sequentially with `repeat_interval` between
    /// sends. The first failed send aborts the remaining repeats.
    pub async fn send(&self, mac: &str, settings: &WakeSettings) -> Result<(), WakeError> {
        let packet: MagicPacket = magic::encode(mac)?;
        let destination = settings.destination();
        let total: u8 = settings.repeat_count();

        for attempt in 1..=total {
            if let Err(source) = self.sender.send_broadcast(&packet, destination).await {
                error!(%destination, attempt, total, error = %source, "magic packet send failed");
                return Err(WakeError::Send {
                    attempt,
                    total,
                    destination,
                    source,
                });
            }
            info!(%destination, "magic packet sent ({attempt}/{total})");

            if attempt < total {
                sleep(settings.repeat_interval()).await;
            }
        }

        info!(%mac, %destination, packets = total, "wake sequence complete");
        Ok(())
    }

    /// Like [`send`](Self::send), folded into a caller-facing report.
    pub async fn wake(&self, mac: &str, settings: &WakeSettings) -> WakeReport {
        let started: Instant = Instant::now();
        let result: Result<(), WakeError> = self.send(mac, settings).await;
        report(None, &result, settings, started)
    }
}

fn packets_sent(result: &Result<(), WakeError>, settings: &WakeSettings) -> u8 {
    match result {
        Ok(()) => settings.repeat_count(),
        Err(WakeError::Send { attempt, .. }) => attempt.saturating_sub(1),
        Err(_) => 0,
    }
}

fn report(
    host_id: Option<&str>,
    result: &Result<(), WakeError>,
    settings: &WakeSettings,
    started: Instant,
) -> WakeReport {
    WakeReport {
        host_id: host_id.map(str::to_string),
        outcome: WakeOutcome::from(result),
        packets_sent: packets_sent(result, settings),
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        attempt: None,
    }
}

/// Wakes configured devices by id and records every attempt.
pub struct WakeService {
    dispatcher: WakeDispatcher,
    directory: Arc<dyn DeviceDirectory>,
    sink: Arc<dyn ChangeSink>,
}

impl WakeService {
    pub fn new(
        dispatcher: WakeDispatcher,
        directory: Arc<dyn DeviceDirectory>,
        sink: Arc<dyn ChangeSink>,
    ) -> Self {
        Self {
            dispatcher,
            directory,
            sink,
        }
    }

    pub async fn wake_host(&self, host_id: &str) -> Result<WakeReport, LookupError> {
        let target: HostTarget = self.directory.require(host_id).await?;
        Ok(self.wake_target(&target).await)
    }

    /// Encoding failures are recorded as failed attempts too.
    pub async fn wake_target(&self, target: &HostTarget) -> WakeReport {
        let started: Instant = Instant::now();
        let result: Result<(), WakeError> = self.dispatcher.send(&target.mac, &target.wake).await;
        let mut report: WakeReport = report(Some(&target.id), &result, &target.wake, started);

        match self.sink.record_wake_attempt(&target.id, &report.outcome).await {
            Ok(attempt) => report.attempt = Some(attempt),
            Err(e) => warn!(host = %target.id, error = %e, "failed to record wake attempt"),
        }
        report
    }

    /// Recorded attempts for a configured device, newest first.
    pub async fn history(&self, host_id: &str) -> anyhow::Result<Vec<WakeAttempt>> {
        let target: HostTarget = self.directory.require(host_id).await?;
        self.sink.wake_history(&target.id).await
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
