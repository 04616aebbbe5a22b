//! Log output for applications embedding Tether.
//!
//! Every crate in the workspace emits `tracing` events; nothing is printed
//! until a subscriber is installed. [`init`] installs a formatted one whose
//! filter comes from the `TETHER_LOG` environment variable (same syntax as
//! `RUST_LOG`, default `warn`):
//!
//! ```text
//! TETHER_LOG=tether_compiler=debug,tether_reactive=trace
//! ```
//!
//! With the `tracing-json` feature, events are written as JSON lines.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding filter directives.
pub const ENV_VAR: &str = "TETHER_LOG";

/// Errors from installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Install the global subscriber, filtered by `TETHER_LOG`.
///
/// Invalid directives are skipped rather than rejected.
pub fn init() -> Result<(), LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(ENV_VAR)
        .from_env_lossy();
    install(filter)
}

/// Install the global subscriber with explicit `directives`, ignoring the
/// environment.
pub fn init_with(directives: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives);
    install(filter)
}

fn install(filter: EnvFilter) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    #[cfg(feature = "tracing-json")]
    let result = builder.json().try_init();
    #[cfg(not(feature = "tracing-json"))]
    let result = builder.try_init();
    result.map_err(LoggingError::AlreadyInstalled)
}
