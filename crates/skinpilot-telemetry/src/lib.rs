//! Prometheus metrics and structured logging for SkinPilot.
//!
//! - Prometheus metrics for marketplace lookups, retries and view sessions
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
