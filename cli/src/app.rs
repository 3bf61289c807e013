//! Wires the core services to the configured adapters.

use std::sync::Arc;

use lanwake_common::config::{Config, PollingSection};
#[cfg(test)]
use lanwake_common::network::host::HostTarget;
use lanwake_common::sending::PacketSender;
use lanwake_core::broadcaster::{SessionTiming, StatusBroadcaster};
use lanwake_core::directory::StaticDirectory;
use lanwake_core::network::transport::NetProbeTransport;
use lanwake_core::network::udp::UdpBroadcastSender;
use lanwake_core::probe::{ProbeConfig, ReachabilityProbe};
use lanwake_core::sink::MemorySink;
use lanwake_core::store::StatusStore;
use lanwake_core::wake::{WakeDispatcher, WakeService};

#[derive(Clone)]
pub struct App {
    pub directory: Arc<StaticDirectory>,
    pub status: StatusBroadcaster,
    pub dispatcher: WakeDispatcher,
    pub waker: Arc<WakeService>,
    pub polling: PollingSection,
    pub resubscribe_backoff: std::time::Duration,
}

impl App {
    pub fn build(cfg: &Config) -> anyhow::Result<Self> {
        let directory: StaticDirectory = StaticDirectory::from_config(cfg)?;
        Ok(Self::assemble(cfg, directory, Arc::new(UdpBroadcastSender)))
    }

    fn assemble(cfg: &Config, directory: StaticDirectory, sender: Arc<dyn PacketSender>) -> Self {
        let directory: Arc<StaticDirectory> = Arc::new(directory);
        let sink: Arc<MemorySink> = Arc::new(MemorySink::new());

        let probe: Arc<ReachabilityProbe> = Arc::new(ReachabilityProbe::new(
            Arc::new(NetProbeTransport),
            ProbeConfig::from(&cfg.probe),
        ));
        let status: StatusBroadcaster = StatusBroadcaster::new(
            probe,
            Arc::new(StatusStore::new()),
            sink.clone(),
            directory.clone(),
        )
        .with_timing(SessionTiming::from(&cfg.stream));

        let dispatcher: WakeDispatcher = WakeDispatcher::new(sender);
        let waker: Arc<WakeService> = Arc::new(WakeService::new(
            dispatcher.clone(),
            directory.clone(),
            sink,
        ));

        Self {
            directory,
            status,
            dispatcher,
            waker,
            polling: cfg.polling.clone(),
            resubscribe_backoff: cfg.stream.resubscribe_backoff(),
        }
    }

    /// An app over fixed devices and a caller-supplied packet sender.
    #[cfg(test)]
    pub(crate) fn for_tests(hosts: Vec<HostTarget>, sender: Arc<dyn PacketSender>) -> Self {
        Self::assemble(&Config::default(), StaticDirectory::new(hosts), sender)
    }
}
