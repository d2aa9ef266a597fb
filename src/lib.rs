//! Beacon Telemetry
//!
//! Device-side telemetry emission: converts loosely-structured event
//! records (nested JSON maps) into typed OpenTelemetry log records and
//! span attributes, and routes them through one of two interchangeable
//! OTLP exporter backends.
//!
//! ```no_run
//! use beacon_telemetry::TelemetryConfig;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), beacon_telemetry::InitError> {
//! beacon_telemetry::init_otlp(&TelemetryConfig::from_env())?;
//! beacon_telemetry::facade::emit(&json!({
//!     "message": "login ok",
//!     "user_id": "42",
//!     "success": true,
//! })).ok();
//! # Ok(())
//! # }
//! ```
//!
//! Emission is a best-effort sink: malformed records become degraded
//! diagnostic entries and export failures stay inside the SDK transport.
//! Application control flow is never interrupted by telemetry.

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod facade;

pub use backend::{
    enrich_span, ElasticBackend, OtlpBackend, TelemetryBackend, DEGRADED_BODY_PREFIX,
};
pub use config::TelemetryConfig;
pub use convert::{convert_for_log, convert_for_span, AttrValue, FlatAttributeSet, LogContent};
pub use error::{InitError, NotInitializedError, RecordError};

/// Connect the generic OTLP backend and install it as the process-wide sink.
///
/// Must be called from within a Tokio runtime. Failure leaves telemetry
/// inert for the process; callers should log and continue rather than
/// abort startup.
pub fn init_otlp(config: &TelemetryConfig) -> Result<(), InitError> {
    let backend = OtlpBackend::connect(config)?;
    facade::init(backend);
    Ok(())
}

/// Connect the Elastic APM backend and install it as the process-wide sink.
///
/// Must be called from within a Tokio runtime. Failure leaves telemetry
/// inert for the process; callers should log and continue rather than
/// abort startup.
pub fn init_elastic(config: &TelemetryConfig) -> Result<(), InitError> {
    let backend = ElasticBackend::connect(config)?;
    facade::init(backend);
    Ok(())
}
