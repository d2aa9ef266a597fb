//! Generic OTLP collector backend

use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::Resource;
use serde_json::Value;
use tracing::info;

use super::{
    auth_metadata, device_resource, emit_event, emit_json_event, ExportPipelines,
    TelemetryBackend,
};
use crate::config::TelemetryConfig;
use crate::error::InitError;

/// Backend exporting to any standard OTLP collector over gRPC, with
/// bearer-token authorization.
///
/// Owns a batch log pipeline and a batch trace pipeline; `emit` only
/// enqueues, export runs asynchronously on the Tokio runtime.
#[derive(Debug)]
pub struct OtlpBackend {
    pipelines: ExportPipelines,
    service_name: String,
}

impl OtlpBackend {
    /// Build the export pipelines from the given configuration.
    ///
    /// Construction is the one-time initialization of this backend: a
    /// connected value cannot be re-initialized. Must be called from within
    /// a Tokio runtime, typically once at application startup.
    pub fn connect(config: &TelemetryConfig) -> Result<Self, InitError> {
        let (endpoint, api_key) = config.require_connection()?;
        let metadata = auth_metadata("Bearer", api_key)?;
        let resource = Resource::default().merge(&Resource::new(device_resource(config)));

        let pipelines =
            ExportPipelines::connect(endpoint, metadata, resource, &config.service_name)?;

        info!(
            service = %config.service_name,
            endpoint = %endpoint,
            "OTLP telemetry backend connected"
        );

        Ok(Self {
            pipelines,
            service_name: config.service_name.clone(),
        })
    }

    /// Tracer backed by this backend's trace pipeline, for callers that
    /// open their own spans and enrich them via [`super::enrich_span`].
    pub fn tracer(&self) -> Tracer {
        self.pipelines.tracer(&self.service_name)
    }
}

impl TelemetryBackend for OtlpBackend {
    fn emit(&self, record: &Value) {
        emit_event(&self.pipelines.logger, record);
    }

    fn emit_json(&self, json: &str) {
        emit_json_event(&self.pipelines.logger, json);
    }

    fn flush(&self) {
        self.pipelines.flush();
    }
}
