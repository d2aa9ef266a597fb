//! Process-wide telemetry facade
//!
//! Call sites emit through one global backend installed once at startup.
//! The slot is write-once with safe publication; the emit path reads the
//! published reference without taking a lock.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::warn;

use crate::backend::TelemetryBackend;
use crate::error::NotInitializedError;

static ACTIVE: OnceLock<Box<dyn TelemetryBackend>> = OnceLock::new();

/// Install the process-wide backend.
///
/// Startup-time operation, expected exactly once per process. A second
/// call keeps the first backend and reports a warning.
pub fn init(backend: impl TelemetryBackend + 'static) {
    if ACTIVE.set(Box::new(backend)).is_err() {
        warn!("telemetry already initialized, keeping the first backend");
    }
}

/// Emit one structured event record through the active backend.
///
/// Fire-and-forget once a backend is installed; the only error surfaced
/// here is emitting before [`init`], which is a programming error rather
/// than a runtime condition.
pub fn emit(record: &Value) -> Result<(), NotInitializedError> {
    let backend = ACTIVE.get().ok_or(NotInitializedError)?;
    backend.emit(record);
    Ok(())
}

/// Parse a raw JSON event and emit it through the active backend.
pub fn emit_json(json: &str) -> Result<(), NotInitializedError> {
    let backend = ACTIVE.get().ok_or(NotInitializedError)?;
    backend.emit_json(json);
    Ok(())
}

/// Whether a backend has been installed.
pub fn is_initialized() -> bool {
    ACTIVE.get().is_some()
}

/// Flush the active backend's export pipelines, if any.
pub fn flush() {
    if let Some(backend) = ACTIVE.get() {
        backend.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct CaptureBackend {
        events: Arc<Mutex<Vec<Value>>>,
    }

    impl TelemetryBackend for CaptureBackend {
        fn emit(&self, record: &Value) {
            self.events.lock().unwrap().push(record.clone());
        }

        fn emit_json(&self, json: &str) {
            if let Ok(record) = serde_json::from_str(json) {
                self.events.lock().unwrap().push(record);
            }
        }

        fn flush(&self) {}
    }

    // The facade is process-global, so its whole lifecycle lives in one
    // test: ordering across multiple test functions would be nondeterministic.
    #[test]
    fn test_facade_lifecycle() {
        let record = json!({"message": "login ok"});
        assert!(!is_initialized());
        assert!(emit(&record).is_err());
        assert!(emit_json("{}").is_err());

        let first = CaptureBackend::default();
        init(first.clone());
        assert!(is_initialized());

        emit(&record).unwrap();
        emit_json(r#"{"user_id": "42"}"#).unwrap();
        assert_eq!(first.events.lock().unwrap().len(), 2);

        // Second init is a no-op; the first backend keeps receiving events.
        let second = CaptureBackend::default();
        init(second.clone());
        emit(&record).unwrap();
        assert_eq!(first.events.lock().unwrap().len(), 3);
        assert!(second.events.lock().unwrap().is_empty());

        flush();
    }
}
