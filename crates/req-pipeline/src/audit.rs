//! JSONL audit log for agentic runs.
//!
//! Appends one record per event to `{run_folder}/audit_log.jsonl`. Records
//! carry a timestamp and elapsed seconds since the logger was created, so
//! a run's timing can be reconstructed from the file alone.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::error::PipelineError;

/// Appends audit events to a run folder's JSONL log.
pub struct AuditLogger {
    run_folder: PathBuf,
    start: Instant,
}

impl AuditLogger {
    /// Create a logger for a run folder, creating the folder if needed.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the directory cannot be created.
    pub fn create(run_folder: PathBuf) -> Result<Self, PipelineError> {
        std::fs::create_dir_all(&run_folder)?;
        Ok(Self {
            run_folder,
            start: Instant::now(),
        })
    }

    /// Append one event. `payload` must be a JSON object; its fields are
    /// merged into the record alongside `ts`, `elapsed_s`, and `event`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file write fails.
    pub fn log(&self, event: &str, payload: Value) -> Result<(), PipelineError> {
        let mut record = Map::new();
        record.insert("ts".to_string(), json!(Utc::now().to_rfc3339()));
        record.insert(
            "elapsed_s".to_string(),
            json!((self.start.elapsed().as_secs_f64() * 1000.0).round() / 1000.0),
        );
        record.insert("event".to_string(), json!(event));
        if let Value::Object(map) = payload {
            record.extend(map);
        }

        let path = self.run_folder.join("audit_log.jsonl");
        serde_jsonlines::append_json_lines(&path, [Value::Object(record)])?;
        Ok(())
    }
}
