#![forbid(unsafe_code)]

//! Diagnostics for probing and table detection.
//!
//! termpix logs at four levels:
//!
//! | Level | Used for |
//! |-------|----------|
//! | `error` | the terminal mode could not be restored after a probe |
//! | `warn` | a `TERMPIX_PROBE*` variable held a value that was ignored |
//! | `debug` | detection choices, probe outcomes, table supplements |
//! | `trace` | raw mode entered |
//!
//! With the `tracing` feature these are the `tracing` macros. Without it the
//! same names expand to nothing, so call sites write `crate::debug!(..)`
//! without their own `cfg` gates. Fields that only feed a log line carry a
//! leading underscore.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Variable read before `RUST_LOG` by [`init_json`].
pub const LOG_ENV: &str = "TERMPIX_LOG";

/// Filter used when neither [`LOG_ENV`] nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVES: &str = "termpix_core=info,termpix_render=info";

/// Pick the filter directives: `termpix_log`, then `rust_log`, then
/// [`DEFAULT_DIRECTIVES`]. Blank values are skipped.
#[must_use]
pub fn directives(termpix_log: Option<&str>, rust_log: Option<&str>) -> String {
    [termpix_log, rust_log]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES)
        .to_owned()
}

/// Install a JSON subscriber on stderr, filtered by [`LOG_ENV`] or
/// `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already set. Malformed
/// directives fall back to [`DEFAULT_DIRECTIVES`].
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let termpix_log = std::env::var(LOG_ENV).ok();
    let rust_log = std::env::var("RUST_LOG").ok();
    let wanted = directives(termpix_log.as_deref(), rust_log.as_deref());
    let filter =
        EnvFilter::try_new(&wanted).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    if installed {
        crate::debug!(filter = %wanted, "json logging installed");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termpix_variable_wins() {
        assert_eq!(
            directives(Some("termpix_core=trace"), Some("warn")),
            "termpix_core=trace"
        );
        assert_eq!(directives(None, Some("warn")), "warn");
    }

    #[test]
    fn blank_values_fall_through() {
        assert_eq!(directives(Some("  "), Some("")), DEFAULT_DIRECTIVES);
        assert_eq!(directives(Some(""), Some("debug")), "debug");
        assert_eq!(directives(None, None), DEFAULT_DIRECTIVES);
    }

    #[test]
    fn macros_are_statements() {
        let _attempts = 3;
        crate::debug!(attempts = _attempts, "retrying");
        crate::trace!("raw mode");
        crate::warn!(value = "x", "ignored");
        crate::error!("restore failed");
    }
}
