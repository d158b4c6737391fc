use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "traceboard")]
#[command(about = "Local service for AI coding session transcripts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the session API, watching the transcript root for changes
    Serve {
        /// Transcript root (defaults to ~/.claude/projects)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Scan the transcript root once and print the sessions
    List {
        /// Transcript root (defaults to ~/.claude/projects)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
