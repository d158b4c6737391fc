use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::service::TranscriptService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TranscriptService>,
    pub port: u16,
}

/// Server-side filters for the session list endpoint. All optional and
/// combined with AND.
#[derive(Debug, Default, Deserialize)]
pub struct SessionFilter {
    /// Free-text query, delegated to the cache's substring search.
    pub q: Option<String>,
    /// Project path substring.
    pub project: Option<String>,
    /// Inclusive lower bound, Unix epoch seconds (fractional allowed).
    pub since: Option<f64>,
    /// Inclusive upper bound, Unix epoch seconds (fractional allowed).
    pub until: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub version: String,
    pub hostname: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub detail: String,
}
