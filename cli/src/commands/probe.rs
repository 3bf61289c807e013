use std::net::IpAddr;
use std::sync::Arc;

use colored::*;
use lanwake_common::config::Config;
use lanwake_common::status::ProbeReport;
use lanwake_common::success;
use lanwake_core::network::transport::NetProbeTransport;
use lanwake_core::probe::{ProbeConfig, ReachabilityProbe};

use crate::terminal::{format, print, spinner};

pub async fn probe(ip: IpAddr, cfg: &Config) -> anyhow::Result<()> {
    let prober: ReachabilityProbe =
        ReachabilityProbe::new(Arc::new(NetProbeTransport), ProbeConfig::from(&cfg.probe));

    let pb = spinner::start(format!("Probing {ip}..."));
    let report: ProbeReport = prober.inspect(ip).await;
    pb.finish_and_clear();

    for result in &report.results {
        print::aligned_line(&result.method.to_string(), format::probe_signal(result));
    }
    print::fat_separator();

    let elapsed: ColoredString = format!("{}ms", report.elapsed_ms).bold().yellow();
    success!(
        "{} is {} ({}/{} signals answered in {})",
        ip,
        format::verdict(report.verdict),
        report.successes().count(),
        report.results.len(),
        elapsed
    );
    Ok(())
}
