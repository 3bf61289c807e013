mod app;
mod commands;
mod terminal;

use commands::{CommandLine, Commands, check, probe, serve, wake, watch};
use lanwake_common::config::Config;
use terminal::{logging, print};

use crate::app::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg: Config = Config::load(commands.config.as_deref())?;

    match commands.command {
        Commands::Wake(args) => {
            print::header("sending wake request");
            wake::wake(args, &App::build(&cfg)?).await
        }
        Commands::Probe { ip } => {
            print::header("probing host");
            probe::probe(ip, &cfg).await
        }
        Commands::Check { follow } => {
            print::header("checking devices");
            check::check(follow, &App::build(&cfg)?).await
        }
        Commands::Watch => {
            print::header("watching device status");
            watch::watch(&App::build(&cfg)?).await
        }
        Commands::Serve { bind } => {
            print::header("starting server");
            serve::serve(bind, App::build(&cfg)?).await
        }
    }
}
