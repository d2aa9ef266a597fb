//! Exporter backends
//!
//! Each backend owns an initialized pair of OTLP export pipelines (logs and
//! traces) and exposes the same fire-and-forget emit contract, so call
//! sites never depend on which exporter is underneath.

mod elastic;
mod otlp;

pub use elastic::ElasticBackend;
pub use otlp::OtlpBackend;

use opentelemetry::logs::{AnyValue, LogRecord, Logger, LoggerProvider as _, Severity};
use opentelemetry::trace::Span;
use opentelemetry::{Key, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs as sdklogs;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::{runtime, Resource};
use opentelemetry_semantic_conventions::resource as semconv;
use serde_json::Value;
use tonic::metadata::{Ascii, MetadataMap, MetadataValue};
use tracing::warn;

use crate::config::TelemetryConfig;
use crate::convert::{self, AttrValue, LogContent};
use crate::error::{InitError, RecordError};

/// Body prefix on the degraded diagnostic record emitted in place of an
/// event that could not be interpreted.
pub const DEGRADED_BODY_PREFIX: &str = "beacon-telemetry: dropped event: ";

/// Uniform emit contract over the concrete exporter backends.
pub trait TelemetryBackend: Send + Sync {
    /// Convert and emit one structured event record.
    ///
    /// Best-effort sink: a record that cannot be interpreted produces a
    /// degraded diagnostic log entry, never an error or a panic. Returns as
    /// soon as the record is enqueued; export happens asynchronously.
    fn emit(&self, record: &Value);

    /// Parse a raw JSON event and emit it.
    fn emit_json(&self, json: &str);

    /// Flush pending records through the export pipelines.
    fn flush(&self);
}

/// Apply an event record to a caller-supplied span as flattened attributes.
///
/// Nested objects become dot-joined keys (`user.id`); arrays and nulls are
/// skipped, matching [`convert::convert_for_span`].
pub fn enrich_span<S: Span>(span: &mut S, record: &Value) {
    for (key, value) in convert::convert_for_span(record, "") {
        span.set_attribute(key_value(key, value));
    }
}

/// Convert one event record and emit it through the given SDK logger.
pub(crate) fn emit_event<L: Logger>(logger: &L, record: &Value) {
    match convert::convert_for_log(record) {
        Ok(content) => emit_content(logger, content),
        Err(err) => emit_degraded(logger, &err),
    }
}

/// Parse a raw JSON event and emit it through the given SDK logger.
pub(crate) fn emit_json_event<L: Logger>(logger: &L, json: &str) {
    match serde_json::from_str::<Value>(json) {
        Ok(record) => emit_event(logger, &record),
        Err(err) => emit_degraded(logger, &RecordError::InvalidJson(err)),
    }
}

fn emit_content<L: Logger>(logger: &L, content: LogContent) {
    let mut builder = LogRecord::builder()
        .with_severity_number(Severity::Info)
        .with_severity_text("INFO");
    if let Some(body) = content.body {
        builder = builder.with_body(AnyValue::from(body));
    }
    let attributes: Vec<(Key, AnyValue)> = content
        .attributes
        .into_iter()
        .map(|(key, value)| (Key::new(key), any_value(value)))
        .collect();
    logger.emit(builder.with_attributes(attributes).build());
}

fn emit_degraded<L: Logger>(logger: &L, err: &RecordError) {
    let record = LogRecord::builder()
        .with_severity_number(Severity::Error)
        .with_severity_text("ERROR")
        .with_body(AnyValue::from(format!("{DEGRADED_BODY_PREFIX}{err}")))
        .build();
    logger.emit(record);
}

fn any_value(value: AttrValue) -> AnyValue {
    match value {
        AttrValue::String(text) => AnyValue::from(text),
        AttrValue::Bool(flag) => AnyValue::from(flag),
        AttrValue::Double(number) => AnyValue::from(number),
    }
}

fn key_value(key: String, value: AttrValue) -> KeyValue {
    match value {
        AttrValue::String(text) => KeyValue::new(key, text),
        AttrValue::Bool(flag) => KeyValue::new(key, flag),
        AttrValue::Double(number) => KeyValue::new(key, number),
    }
}

/// Service identity and device descriptors shared by every backend's
/// resource. Each variant layers its own attributes on top.
pub(crate) fn device_resource(config: &TelemetryConfig) -> Vec<KeyValue> {
    vec![
        semconv::SERVICE_NAME.string(config.service_name.clone()),
        semconv::SERVICE_VERSION.string(config.service_version.clone()),
        semconv::SERVICE_INSTANCE_ID.string(uuid::Uuid::new_v4().to_string()),
        semconv::DEPLOYMENT_ENVIRONMENT.string(config.environment.clone()),
        semconv::OS_TYPE.string(std::env::consts::OS),
        semconv::HOST_ARCH.string(std::env::consts::ARCH),
        semconv::PROCESS_RUNTIME_NAME.string("rust"),
    ]
}

/// Authorization metadata for the OTLP transport, e.g. `Bearer <key>` or
/// `ApiKey <key>` depending on the backend's scheme.
pub(crate) fn auth_metadata(scheme: &str, api_key: &str) -> Result<MetadataMap, InitError> {
    let value: MetadataValue<Ascii> = format!("{scheme} {api_key}")
        .parse()
        .map_err(|_| InitError::Config("API key contains invalid header characters".to_string()))?;
    let mut metadata = MetadataMap::new();
    metadata.insert("authorization", value);
    Ok(metadata)
}

/// One batch log pipeline plus one batch trace pipeline over OTLP gRPC.
///
/// Shared by both backend variants; construction must happen inside a Tokio
/// runtime because the batch processors export on it.
#[derive(Debug)]
pub(crate) struct ExportPipelines {
    pub(crate) logger: sdklogs::Logger,
    logger_provider: sdklogs::LoggerProvider,
    tracer_provider: sdktrace::TracerProvider,
}

impl ExportPipelines {
    pub(crate) fn connect(
        endpoint: &str,
        metadata: MetadataMap,
        resource: Resource,
        service_name: &str,
    ) -> Result<Self, InitError> {
        let span_exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .with_metadata(metadata.clone())
            .build_span_exporter()?;

        let log_exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .with_metadata(metadata)
            .build_log_exporter()?;

        let tracer_provider = sdktrace::TracerProvider::builder()
            .with_config(sdktrace::config().with_resource(resource.clone()))
            .with_batch_exporter(span_exporter, runtime::Tokio)
            .build();

        let logger_provider = sdklogs::LoggerProvider::builder()
            .with_config(sdklogs::Config::default().with_resource(resource))
            .with_batch_exporter(log_exporter, runtime::Tokio)
            .build();

        let logger = logger_provider.logger(service_name.to_string());

        Ok(Self {
            logger,
            logger_provider,
            tracer_provider,
        })
    }

    pub(crate) fn tracer(&self, service_name: &str) -> sdktrace::Tracer {
        use opentelemetry::trace::TracerProvider as _;
        self.tracer_provider.tracer(service_name.to_string())
    }

    pub(crate) fn flush(&self) {
        for result in self.logger_provider.force_flush() {
            if let Err(err) = result {
                warn!(error = %err, "log pipeline flush failed");
            }
        }
        for result in self.tracer_provider.force_flush() {
            if let Err(err) = result {
                warn!(error = %err, "trace pipeline flush failed");
            }
        }
    }
}
