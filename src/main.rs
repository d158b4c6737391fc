use clap::Parser;
use tracing_subscriber::EnvFilter;

use traceboard::cli::{handlers, Cli, Commands};
use traceboard::{Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("traceboard=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { root, port } => handlers::serve(config, root, port).await,
        Commands::List { root, json } => handlers::list_sessions(config, root, json).await,
    }
}
