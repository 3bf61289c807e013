pub mod check;
pub mod probe;
pub mod serve;
pub mod wake;
pub mod watch;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lanwake")]
#[command(about = "Wake-on-LAN and device reachability.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./lanwake.toml when present)
    #[arg(short, long, global = true, env = "LANWAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send magic packets to a configured device or a raw MAC address
    #[command(alias = "w")]
    Wake(WakeArgs),
    /// Run every liveness probe against one address and show each signal
    #[command(alias = "p")]
    Probe { ip: IpAddr },
    /// Check all configured devices once, or keep polling with --follow
    #[command(alias = "c")]
    Check {
        #[arg(short, long)]
        follow: bool,
    },
    /// Open a push session and print its events as JSON lines
    Watch,
    /// Serve the HTTP and server-sent events API
    #[command(alias = "s")]
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },
}

#[derive(Args, Debug, Clone)]
pub struct WakeArgs {
    /// Device id from the configuration, or a MAC address
    pub target: String,

    #[arg(short, long)]
    pub broadcast: Option<Ipv4Addr>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of packets to send (1-10)
    #[arg(short = 'n', long)]
    pub count: Option<u8>,

    /// Delay between packets in milliseconds (100-5000)
    #[arg(short, long)]
    pub interval_ms: Option<u64>,
}

impl WakeArgs {
    pub fn has_overrides(&self) -> bool {
        self.broadcast.is_some()
            || self.port.is_some()
            || self.count.is_some()
            || self.interval_ms.is_some()
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
    use clap::CommandFactory;

    #[test]
    fn command_line_should_be_well_formed() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn wake_should_accept_overrides() {
        let cli = CommandLine::try_parse_from([
            "lanwake", "wake", "AA:BB:CC:DD:EE:FF", "--broadcast", "192.168.0.255", "-n", "5",
        ])
        .unwrap();
        let Commands::Wake(args) = cli.command else {
            panic!("expected wake");
        };
        assert_eq!(args.broadcast, Some(Ipv4Addr::new(192, 168, 0, 255)));
        assert_eq!(args.count, Some(5));
        assert!(args.has_overrides());
    }

    #[test]
    fn verbose_should_count_occurrences() {
        let cli = CommandLine::try_parse_from(["lanwake", "-vv", "check", "--follow"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check { follow: true }));
    }
}
