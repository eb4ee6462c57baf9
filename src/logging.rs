//! Process-wide tracing setup.
//!
//! # Invariants
//! - Initialization happens at most once per process; repeating it with the
//!   same level is a no-op, a different level is rejected.
//! - `RUST_LOG`, when set, overrides the requested level.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static ACTIVE_LEVEL: OnceCell<&'static str> = OnceCell::new();

/// Installs the fmt subscriber at `level` (trace|debug|info|warn|error).
pub fn init_logging(level: &str) -> Result<(), String> {
    let level = normalize_level(level)?;

    // Concurrent first calls block here until one of them has installed
    // the subscriber.
    let active = ACTIVE_LEVEL.get_or_try_init(|| -> Result<&'static str, String> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|err| format!("invalid log filter: {err}"))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .map_err(|err| format!("failed to install logger: {err}"))?;

        Ok(level)
    })?;

    if *active != level {
        return Err(format!(
            "logging already initialized with level `{active}`; refusing to switch to `{level}`"
        ));
    }
    Ok(())
}

pub fn logging_level() -> Option<&'static str> {
    ACTIVE_LEVEL.get().copied()
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}
