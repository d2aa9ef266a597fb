//! Elastic APM agent backend
//!
//! Same OTLP gRPC protocol as the generic backend, pointed at an Elastic
//! APM intake: `ApiKey` authorization scheme and the Elastic distro
//! resource attributes the APM server keys on.

use opentelemetry::KeyValue;
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

/// Backend exporting to an Elastic APM server.
#[derive(Debug)]
pub struct ElasticBackend {
    pipelines: ExportPipelines,
    service_name: String,
}

impl ElasticBackend {
    /// Build the export pipelines against the Elastic APM intake.
    ///
    /// Construction is the one-time initialization of this backend. Must be
    /// called from within a Tokio runtime, typically once at startup.
    pub fn connect(config: &TelemetryConfig) -> Result<Self, InitError> {
        let (endpoint, api_key) = config.require_connection()?;
        let metadata = auth_metadata("ApiKey", api_key)?;

        let mut attrs = device_resource(config);
        attrs.push(KeyValue::new("telemetry.distro.name", "beacon-elastic"));
        attrs.push(KeyValue::new(
            "telemetry.distro.version",
            env!("CARGO_PKG_VERSION"),
        ));
        let resource = Resource::default().merge(&Resource::new(attrs));

        let pipelines =
            ExportPipelines::connect(endpoint, metadata, resource, &config.service_name)?;

        info!(
            service = %config.service_name,
            endpoint = %endpoint,
            "Elastic APM telemetry backend connected"
        );

        Ok(Self {
            pipelines,
            service_name: config.service_name.clone(),
        })
    }

    /// Tracer backed by this backend's trace pipeline.
    pub fn tracer(&self) -> Tracer {
        self.pipelines.tracer(&self.service_name)
    }
}

impl TelemetryBackend for ElasticBackend {
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
