//! Logging utilities.
//!
//! The library itself only emits through the `log` facade; this module is a
//! convenience for binaries and tests that want an `env_logger` backend.

mod init;

pub use init::{init_logging, LoggingConfig};
