use anyhow::Context;
use clap::Parser;
use oco2_processor::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("oco2-processor failed")
}
