mod cli;
mod config;
mod error;
mod event;
mod github;
mod model;
mod sync;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match cli::parse_args(&args)? {
        Command::Help => {
            cli::print_help();
            Ok(())
        }
        Command::Run(options) => cli::run(options).await,
    }
}
