use tracing::Level;

/// Initialize the global tracing subscriber.
///
/// `default_level` is a case-insensitive level name; anything unrecognized
/// falls back to `info`.
pub fn init(default_level: &str) {
    let level = match default_level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    // try_init so tests can call this repeatedly without panicking.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
