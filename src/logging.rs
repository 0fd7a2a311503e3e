//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The engine's textual output (topology dumps, cycle traces, the final
//! loop summary) is emitted as `tracing` events. Embedders that want to
//! see it install a subscriber, either their own or the one from
//! [`init`]. The log level comes from the `DAGRUN_LOG` environment
//! variable (e.g. "info", "debug"), defaulting to `info`.

use tracing::Level;
use tracing_subscriber::fmt;

/// Initialise a global logging subscriber.
///
/// Call once at startup. The global subscriber can only be set once; a
/// second call panics.
pub fn init() {
    let level = std::env::var("DAGRUN_LOG")
        .ok()
        .and_then(|value| parse_level_str(&value))
        .unwrap_or(Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_names(true)
        .init();
}

fn parse_level_str(value: &str) -> Option<Level> {
    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
