mod commands;
mod shutdown;
mod startup;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = commands::Cli::parse();

    info!("Starting garagehours");

    // Load configuration
    let config = startup::load_config()?;

    // Cancel in-flight work (the slot watcher in particular) on SIGTERM/SIGINT
    let token = CancellationToken::new();
    tokio::spawn(shutdown::handle_signals(token.clone()));

    commands::run(cli, config, token).await
}
