//! Centralized logging configuration.
//!
//! Provides a consistent tracing setup with default INFO level for binaries
//! and tests that want to observe term evaluation (the car-like term logs its
//! residual internals at TRACE).

use tracing::Level;

/// Initialize the tracing subscriber with the standard configuration.
///
/// Default log level: INFO (overrideable via the `RUST_LOG` environment
/// variable, e.g. `RUST_LOG=kinematic_factors=trace`).
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level.
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via `RUST_LOG`)
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}
