//! Shared utilities for Shellbook services.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::format_remaining;
