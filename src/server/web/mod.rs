pub mod access;
pub mod info;
pub mod routes;
pub mod sessions;
pub mod stream;
pub mod types;

pub use routes::{build_router, start_web_server};
pub use types::AppState;
