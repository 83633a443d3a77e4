pub mod config;
pub mod handlers;

pub use config::{ConfigError, ServerConfig};
pub use handlers::{ApiError, AppState, DEFAULT_MAX_WORDS, router};
