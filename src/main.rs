//! willcircle entry point.

use clap::Parser;

use willcircle::cli::{Cli, Commands};
use willcircle::infrastructure::config::ConfigLoader;
use willcircle::infrastructure::logging::Logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _logger = Logger::init(&config.logging)?;

    match cli.command {
        Commands::Serve => willcircle::cli::serve(config).await,
        Commands::Tick => willcircle::cli::tick(config).await,
        Commands::Migrate => willcircle::cli::migrate(config).await,
    }
}
