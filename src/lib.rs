// Traceboard Library
// Scans AI coding session transcripts and serves them over a local API

pub mod cache;
pub mod cli;
pub mod config;
pub mod gitmeta;
pub mod index;
pub mod model;
pub mod monitor;
pub mod pipeline;
pub mod scanner;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use cache::SessionCache;
pub use config::Config;
pub use index::SearchIndex;
pub use model::{Message, ParsedSession, Role, Session, Snapshot};
pub use pipeline::{PipelineState, PipelineStatus, RefreshHandle};
pub use service::TranscriptService;

// Error handling
pub use anyhow::{Error, Result};
