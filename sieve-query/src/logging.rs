//! Logging setup for Sieve.
//!
//! Compilation and cache activity emit `tracing` events; this module wires
//! a subscriber for applications that do not bring their own.
//!
//! # Environment Variables
//!
//! - `SIEVE_DEBUG=true|1|yes` - enable debug logging
//! - `SIEVE_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//!
//! ```rust,no_run
//! sieve_query::logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `SIEVE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIEVE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `SIEVE_LOG_LEVEL`.
///
/// Defaults to "debug" when `SIEVE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    match env::var("SIEVE_LOG_LEVEL")
        .map(|level| level.to_lowercase())
        .as_deref()
    {
        Ok("trace") => "trace",
        Ok("debug") => "debug",
        Ok("info") => "info",
        Ok("warn") => "warn",
        Ok("error") => "error",
        _ if is_debug_enabled() => "debug",
        _ => "warn",
    }
}

/// Initialize the logging subscriber once; later calls are no-ops.
///
/// Does nothing unless `SIEVE_DEBUG` or `SIEVE_LOG_LEVEL` is set, so an
/// application with its own subscriber is never overridden.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SIEVE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::EnvFilter;

            let filter = EnvFilter::try_new(format!("sieve={}", get_log_level()))
                .unwrap_or_else(|_| EnvFilter::new("warn"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_without_env() {
        // Level falls back to warn when neither variable is set; with
        // SIEVE_DEBUG the default becomes debug. Only exercise the parser to
        // avoid mutating process env in parallel tests.
        let level = get_log_level();
        assert!(matches!(level, "trace" | "debug" | "info" | "warn" | "error"));
    }
}
