mod cli;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use webopener::config::Config;
use webopener::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    observability::init_tracing(&config.telemetry);

    match cli.command {
        Commands::Run(args) => runner::run(config, args).await?,
        Commands::Config => print!("{}", toml::to_string_pretty(&config)?),
    }

    Ok(())
}
