use anyhow::Result;
use clap::Parser;

use filesize_filter::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
