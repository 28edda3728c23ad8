//! addrbook - terminal front end for the address-book API

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();
    cli.execute().await
}
