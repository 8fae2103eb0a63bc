pub mod discovery;
pub mod error;
pub mod loader;
pub mod types;

pub use discovery::discover;
pub use error::ConfigError;
pub use loader::load;
pub use types::{
    FlushPolicy, TailConfig, DEFAULT_LINES, DEFAULT_POLL_INTERVAL, DEFAULT_QUIESCENCE,
};
