//! Logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mimic_core::{MimicError, MimicResult};

use crate::LogConfig;

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn log_filter(config: &LogConfig) -> MimicResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| MimicError::InvalidConfig(format!("logging.level {:?}: {}", config.level, e))),
    }
}

/// Install the global subscriber.
///
/// Fails if the level directive is invalid or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> MimicResult<()> {
    let filter = log_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };
    result.map_err(|e| MimicError::InvalidConfig(format!("logging already initialized: {}", e)))
}
