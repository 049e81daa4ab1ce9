//! EdgeBoard - clipboard history for the desktop overlay
//!
//! This is the main entry point for the EdgeBoard CLI.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edgeboard::cli::{Cli, CliHandler};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let handler = CliHandler::new(cli.config.clone())?;

    // Initialize logging; stdout is reserved for history updates
    let log_level = if cli.verbose {
        "debug"
    } else {
        handler.config().log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("edgeboard={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("EdgeBoard v{}", env!("CARGO_PKG_VERSION"));

    handler.handle_command(cli.command).await?;

    Ok(())
}
