//! Logging setup plus conditional macros gated on a module-level
//! `ENABLE_LOGS` flag, for modules whose per-image chatter is only wanted
//! while debugging the pipeline.
//!
//! Each module using the macros defines the flag first:
//! ```rust
//! const ENABLE_LOGS: bool = true;
//! ```
//! then uses `log_info!` / `log_warn!` / `log_error!` (exported at the
//! crate root).

/// Initialize env_logger for binaries (reads RUST_LOG, defaults to info).
pub fn init() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
