//! Tracing/logging setup shared by codeforge binaries and integration tests.
//!
//! Scoped down to the pieces this pipeline actually needs: a builder-style
//! [`TracingConfig`] and a single [`init`] entry point, instead of a full
//! OpenTelemetry/Prometheus exporter stack (nothing in this pipeline calls
//! for exporting codeforge's own telemetry to an external collector).

pub mod config;
pub mod error;
pub mod init;

pub use config::TracingConfig;
pub use error::{Error, Result};
pub use init::init;
