//! Logger setup on top of the `log` facade, backed by `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
