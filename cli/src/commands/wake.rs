use colored::*;
use lanwake_common::directory::DeviceDirectory;
use lanwake_common::network::host::HostTarget;
use lanwake_common::network::mac::MacAddress;
use lanwake_common::success;
use lanwake_common::vendors::VendorRepository;
use lanwake_common::wake::{WakeReport, WakeSettings};
use lanwake_core::vendors::MacOuiRepo;
use tracing::error;

use crate::app::App;
use crate::commands::WakeArgs;
use crate::terminal::{format, network_fmt, print, spinner};

pub async fn wake(args: WakeArgs, app: &App) -> anyhow::Result<()> {
    let (target, configured): (HostTarget, bool) = resolve_target(&args, app).await?;
    let vendor: Option<String> = target
        .mac
        .parse::<MacAddress>()
        .ok()
        .and_then(|mac| MacOuiRepo.get_vendor(mac));

    print::tree_head(0, target.display_name());
    print::as_tree_one_level(network_fmt::host_to_key_value_pair(&target, vendor.as_deref()));

    let pb = spinner::start(format!("Waking {}...", target.display_name()));
    // Only configured devices get their attempts recorded.
    let report: WakeReport = if configured {
        app.waker.wake_target(&target).await
    } else {
        app.dispatcher.wake(&target.mac, &target.wake).await
    };
    pb.finish_and_clear();

    print_report(&report);
    match report.outcome.detail() {
        None => Ok(()),
        Some(detail) => anyhow::bail!("wake failed: {detail}"),
    }
}

async fn resolve_target(args: &WakeArgs, app: &App) -> anyhow::Result<(HostTarget, bool)> {
    let found: Option<HostTarget> = app.directory.find(&args.target).await?;
    let (mut target, configured): (HostTarget, bool) = match found {
        Some(target) => (target, true),
        None => {
            if let Err(e) = args.target.parse::<MacAddress>() {
                anyhow::bail!(
                    "'{}' is neither a configured device nor a MAC address ({e})",
                    args.target
                );
            }
            (HostTarget::new(&args.target, &args.target), false)
        }
    };

    if args.has_overrides() {
        target.wake = overridden(&target.wake, args)?;
    }
    Ok((target, configured))
}

fn overridden(base: &WakeSettings, args: &WakeArgs) -> anyhow::Result<WakeSettings> {
    let base_interval: u64 = u64::try_from(base.repeat_interval().as_millis()).unwrap_or(u64::MAX);
    let settings: WakeSettings = WakeSettings::new(
        args.broadcast.unwrap_or(base.broadcast()),
        args.port.unwrap_or(base.port()),
        args.count.unwrap_or(base.repeat_count()),
        args.interval_ms.unwrap_or(base_interval),
    )?;
    Ok(settings)
}

fn print_report(report: &WakeReport) {
    print::aligned_line("Outcome", format::outcome(&report.outcome));
    print::aligned_line("Packets", report.packets_sent.to_string());
    print::aligned_line("Elapsed", format::elapsed_ms(report.elapsed_ms));
    print::fat_separator();

    if report.outcome.is_success() {
        let sent: ColoredString = format!("{} magic packets", report.packets_sent).bold().green();
        success!("Wake request delivered: {sent}");
    } else {
        error!("Wake request failed; the device was not woken");
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn args(count: Option<u8>, interval_ms: Option<u64>) -> WakeArgs {
        WakeArgs {
            target: "AA:BB:CC:DD:EE:FF".into(),
            broadcast: Some(Ipv4Addr::new(10, 0, 0, 255)),
            port: None,
            count,
            interval_ms,
        }
    }

    #[test]
    fn overridden_should_keep_unset_fields() {
        let base = WakeSettings::new(Ipv4Addr::BROADCAST, 7, 4, 800).unwrap();
        let merged = overridden(&base, &args(None, None)).unwrap();
        assert_eq!(merged.broadcast(), Ipv4Addr::new(10, 0, 0, 255));
        assert_eq!(merged.port(), 7);
        assert_eq!(merged.repeat_count(), 4);
        assert_eq!(merged.repeat_interval(), Duration::from_millis(800));
    }

    #[test]
    fn overridden_should_validate_ranges() {
        let base = WakeSettings::default();
        assert!(overridden(&base, &args(Some(11), None)).is_err());
        assert!(overridden(&base, &args(None, Some(20))).is_err());
    }
}
