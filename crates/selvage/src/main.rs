//! selvage - licensing and model delivery backend

use clap::Parser;
use color_eyre::eyre::Result;
use selvage::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(cmd) => cmd.run().await,
        Command::Licenses(cmd) => cmd.run().await,
        Command::Models(cmd) => cmd.run().await,
        Command::Reviews(cmd) => cmd.run().await,
    }
}
