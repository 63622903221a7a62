//! Process-wide subscriber installation.

use crate::config::TracingConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global tracing subscriber built from `config`.
///
/// Returns [`Error::AlreadyInitialized`] if a global subscriber is already
/// set (calling this twice in one process, e.g. in tests, is a caller bug).
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = match &config.filter_directive {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| Error::InvalidFilter(directive.clone(), e.to_string()))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = fmt::Subscriber::builder().with_env_filter(filter);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|_| Error::AlreadyInitialized)
}
