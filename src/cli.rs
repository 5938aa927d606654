use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "webopener")]
#[command(about = "Open a web page after a delay and close it after a viewing time", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $WEBOPENER_CONFIG or config/webopener.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single timed job; Ctrl+C cancels it
    Run(RunArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Page to open (http or https)
    #[arg(long)]
    pub url: String,

    /// Seconds to wait before opening the page (1-300)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    pub delay: i64,

    /// Seconds to keep the page open (1-3600)
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    pub duration: i64,

    /// Simulate the browser window instead of launching one
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final status as JSON
    #[arg(long)]
    pub json: bool,
}
