//! ortpull CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ortpull_cli::Cli;
use ortpull_cli::cmd;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        cmd::list::list();
        return Ok(());
    }

    let complete = cmd::fetch::fetch(&cli).await?;
    if cli.strict && !complete {
        std::process::exit(1);
    }
    Ok(())
}
