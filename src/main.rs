use clap::Parser;

use crate::cmd::Cmd;
use crate::config::ApiConfig;

mod api_client;
mod cached_client;
mod client;
mod cmd;
mod config;
mod error;
mod render;
mod server;
mod stats;
mod telemetry;
mod types;

/// Board game play statistics from BoardGameGeek
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Log filter, e.g. `info`, `warn` or `playlog=debug`
    #[arg(long, env = "PLAYLOG_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(flatten)]
    api: ApiConfig,

    #[command(subcommand)]
    cmd: Cmd,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // stderr keeps `--json` output on stdout clean
    let subscriber = telemetry::get_subscriber(cli.log_level, std::io::stderr);
    telemetry::init_subscriber(subscriber)?;

    cli.cmd.run(cli.api).await
}
