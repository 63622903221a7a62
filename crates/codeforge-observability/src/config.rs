//! Configuration for the process-wide tracing subscriber.

use serde::{Deserialize, Serialize};

/// Configuration for logging/tracing: a plain struct with a `new()` plus
/// `with_*` builder methods, constructed once at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Service name attached to every span (shown in logs as `service`).
    pub service_name: String,

    /// Env-filter directive string (e.g. `"codeforge_core=debug,info"`).
    /// Falls back to `RUST_LOG` when `None`.
    pub filter_directive: Option<String>,

    /// Emit JSON-formatted log lines instead of human-readable text.
    pub json: bool,
}

impl TracingConfig {
    /// Default configuration: info-level, human-readable, service `codeforge`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service_name: "codeforge".to_string(),
            filter_directive: None,
            json: false,
        }
    }

    /// Set the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set an explicit filter directive, overriding `RUST_LOG`.
    #[must_use]
    pub fn with_filter_directive(mut self, directive: impl Into<String>) -> Self {
        self.filter_directive = Some(directive.into());
        self
    }

    /// Emit JSON log lines.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_human_readable_info_level() {
        let config = TracingConfig::new();
        assert_eq!(config.service_name, "codeforge");
        assert!(config.filter_directive.is_none());
        assert!(!config.json);
    }

    #[test]
    fn builder_methods_chain() {
        let config = TracingConfig::new()
            .with_service_name("codeforge-cli")
            .with_filter_directive("debug")
            .with_json(true);
        assert_eq!(config.service_name, "codeforge-cli");
        assert_eq!(config.filter_directive.as_deref(), Some("debug"));
        assert!(config.json);
    }
}
