//! Error types for the telemetry SDK

use thiserror::Error;

/// Failure to interpret an event record.
///
/// These never cross the emit boundary: backends absorb them and emit a
/// degraded diagnostic record in place of the event.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Record is not a JSON object: got {0}")]
    NotAnObject(&'static str),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Failure to construct an exporter backend.
///
/// Surfaced to startup code; telemetry stays inert for the process but the
/// host application keeps running.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Trace exporter setup failed: {0}")]
    TraceExporter(#[from] opentelemetry::trace::TraceError),

    #[error("Log exporter setup failed: {0}")]
    LogExporter(#[from] opentelemetry::logs::LogError),
}

/// Emit was called before a backend was installed.
#[derive(Debug, Error)]
#[error("Telemetry not initialized: install a backend before emitting")]
pub struct NotInitializedError;
