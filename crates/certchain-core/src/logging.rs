// Tracing and observability utilities

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::RegistryConfig;

/// Error returned when the global subscriber cannot be installed
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

//-----------------------------------------------------------------------------
// Tracing Initialization
//-----------------------------------------------------------------------------

/// Initializes the tracing subscriber with configurable log level and output format.
///
/// # Arguments
///
/// * `log_level`: An optional filter directive. Defaults to "info".
///                Can also include module-specific directives, e.g. "certchain_core=debug,info".
///                `RUST_LOG` takes precedence when set.
/// * `json_output`: Whether to output logs in JSON format. Defaults to `false`.
pub fn init_tracing(log_level: Option<&str>, json_output: Option<bool>) -> Result<(), InitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))?;

    let subscriber = Registry::default().with(env_filter);

    if json_output.unwrap_or(false) {
        let json_layer = fmt::layer().json().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else {
        let fmt_layer = fmt::layer().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    }

    Ok(())
}

/// Initializes tracing from the registry configuration
pub fn init_tracing_from_config(config: &RegistryConfig) -> Result<(), InitError> {
    init_tracing(Some(&config.log_level), Some(config.json_logs))
}

static TEST_INIT: Once = Once::new();

/// Initialize test logging at debug level (called once per test run)
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug"));
        let fmt_layer = fmt::layer().with_target(true).with_test_writer();
        // Another harness may already own the global subscriber.
        let _ = tracing::subscriber::set_global_default(
            Registry::default().with(env_filter).with(fmt_layer),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("test logging initialized");
    }
}
