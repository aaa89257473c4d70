//! regstat CLI - audit trail for container registry notifications.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regstat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args).await,
        Commands::Replay(args) => commands::replay::execute(args).await,
        Commands::Fetch(args) => commands::fetch::execute(args).await,
        Commands::Schema(args) => commands::schema::execute(args).await,
        Commands::Version => {
            println!("regstat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
