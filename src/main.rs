use clap::Parser;
use oproute::cli::{run_cli, Cli};
use oproute::logging::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging(&LogConfig::from_env())?;
    run_cli(Cli::parse()).await
}
