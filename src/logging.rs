//! Tracing subscriber setup for the binary.
//!
//! Level comes from `LOG_LEVEL` (trace|debug|info|warn|error). Without it,
//! debug builds log at DEBUG and release builds at INFO. Output goes to
//! stderr so stdout stays clean JSON.

use tracing::metadata::LevelFilter;

pub fn level_from(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => LevelFilter::TRACE,
        Some("debug") => LevelFilter::DEBUG,
        Some("info") => LevelFilter::INFO,
        Some("warn") => LevelFilter::WARN,
        Some("error") => LevelFilter::ERROR,
        Some("off") => LevelFilter::OFF,
        _ if cfg!(debug_assertions) => LevelFilter::DEBUG,
        _ => LevelFilter::INFO,
    }
}

pub fn init() {
    let level = level_from(std::env::var("LOG_LEVEL").ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
