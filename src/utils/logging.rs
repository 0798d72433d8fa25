//! Logger setup plus conditional logging macros gated by a module-level
//! `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::log_info;
//!
//! log_info!("Seeded {} estimates", count);
//! ```

use std::str::FromStr;

use anyhow::{anyhow, Result};
use log::LevelFilter;

/// Initialise `env_logger` at `level` (trace, debug, info, warn, error).
/// `RUST_LOG` still overrides per-module filters.
pub fn init_logging(level: &str) -> Result<()> {
    let level = LevelFilter::from_str(level)
        .map_err(|_| anyhow!("invalid log level '{level}'"))?;

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}

/// Info log that only fires when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn log that only fires when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
