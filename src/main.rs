use anyhow::Result;
use clap::Parser;
use daybook::cli::Cli;
use daybook::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.run().await
}
