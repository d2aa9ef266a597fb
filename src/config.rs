//! Telemetry configuration

use serde::Deserialize;
use std::env;

use crate::error::InitError;

/// Configuration bundle for a telemetry backend.
///
/// Supplied once when the backend is constructed and never mutated
/// afterwards. The service identity and environment become resource
/// metadata on every exported record; endpoint and API key are handed to
/// the exporter transport unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "beacon-service".to_string(),
            service_version: "0.0.0".to_string(),
            environment: "development".to_string(),
            endpoint: None,
            api_key: None,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "beacon-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| "0.0.0".to_string()),
            environment: env::var("DEPLOYMENT_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            api_key: env::var("OTEL_EXPORTER_API_KEY").ok(),
        }
    }

    /// Endpoint and credential, or a config error naming what is missing.
    pub(crate) fn require_connection(&self) -> Result<(&str, &str), InitError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| InitError::Config("Collector endpoint is not set".to_string()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| InitError::Config("API key is not set".to_string()))?;
        Ok((endpoint, api_key))
    }
}
