//! Urbanista CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use urbanista::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => urbanista::cli::commands::ask::execute(args, cli.json).await,
        Commands::History(args) => {
            urbanista::cli::commands::history::execute(args, cli.json).await
        }
        Commands::Init(args) => urbanista::cli::commands::init::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
