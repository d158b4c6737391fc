pub mod web;

pub use web::{build_router, start_web_server, AppState};
