//! Task definitions handed to the worker
//!
//! A task definition is a JSON document whose `payload` names the upstream
//! artifacts to publish and the channel they were signed for:
//!
//! ```json
//! {
//!   "payload": {
//!     "parent_task_artifacts_url": "https://queue.example.com/task/abc/artifacts/public/env",
//!     "signing_cert": "nightly"
//!   }
//! }
//! ```
//!
//! Loading validates the document with [`verify_task_schema`] before any field
//! is read.

mod schema;

pub use schema::{SchemaError, SigningChannels, verify_task_schema, verify_task_schema_default};

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Failed to read task definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task definition is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task definition is malformed: {0}")]
    Schema(#[from] SchemaError),

    #[error("Task signed for unsupported channel '{0}'")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;

/// The parts of a validated task the worker acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayload {
    pub parent_task_artifacts_url: String,
    pub signing_cert: String,
}

impl TaskPayload {
    /// Extract the payload from a document that already passed schema checks.
    ///
    /// A non-string artifacts URL is rendered as JSON text.
    fn from_validated(task: &Value) -> Self {
        let payload = &task["payload"];
        let parent_task_artifacts_url = match &payload["parent_task_artifacts_url"] {
            Value::String(url) => url.clone(),
            other => other.to_string(),
        };
        let signing_cert = payload["signing_cert"].as_str().unwrap_or_default().to_string();

        Self {
            parent_task_artifacts_url,
            signing_cert,
        }
    }

    /// Location of the artifact manifest produced by the parent task
    pub fn manifest_url(&self) -> String {
        format!(
            "{}/manifest.json",
            self.parent_task_artifacts_url.trim_end_matches('/')
        )
    }
}

/// Validate an in-memory task definition and extract its payload
pub fn parse_task(task: &Value, channels: &SigningChannels) -> Result<TaskPayload> {
    if !verify_task_schema(task, channels)? {
        let cert = task["payload"]["signing_cert"].as_str().unwrap_or_default();
        return Err(TaskError::Rejected(cert.to_string()));
    }
    Ok(TaskPayload::from_validated(task))
}

/// Read, parse, and validate the task definition at `path`
pub fn load_task(path: &Path, channels: &SigningChannels) -> Result<TaskPayload> {
    tracing::info!("Loading task definition from: {}", path.display());

    let raw = std::fs::read_to_string(path)?;
    let task: Value = serde_json::from_str(&raw)?;
    parse_task(&task, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_task() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_taskdef.json");
        fs::write(
            &path,
            r#"{"payload": {"parent_task_artifacts_url": "www.taskcluster.net", "signing_cert": "nightly"}}"#,
        )
        .unwrap();

        let payload = load_task(&path, &SigningChannels::default()).unwrap();
        assert_eq!(payload.parent_task_artifacts_url, "www.taskcluster.net");
        assert_eq!(payload.signing_cert, "nightly");
        assert_eq!(payload.manifest_url(), "www.taskcluster.net/manifest.json");
    }

    #[test]
    fn test_load_task_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_task(&temp_dir.path().join("nope.json"), &SigningChannels::default());
        assert!(matches!(result, Err(TaskError::Io(_))));
    }

    #[test]
    fn test_load_task_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{payload").unwrap();

        let result = load_task(&path, &SigningChannels::default());
        assert!(matches!(result, Err(TaskError::Json(_))));
    }

    #[test]
    fn test_parse_task_schema_error() {
        let task = json!({"payload": {"signing_cert": "release"}});
        let result = parse_task(&task, &SigningChannels::default());
        assert!(matches!(
            result,
            Err(TaskError::Schema(SchemaError::MissingArtifactsUrl))
        ));
    }

    #[test]
    fn test_parse_task_rejected_channel() {
        let task = json!({"payload": {"parent_task_artifacts_url": "u", "signing_cert": "beta"}});
        let result = parse_task(&task, &SigningChannels::default());
        assert!(matches!(result, Err(TaskError::Rejected(cert)) if cert == "beta"));
    }

    #[test]
    fn test_numeric_url_is_rendered() {
        let task = json!({"payload": {"parent_task_artifacts_url": 500, "signing_cert": "release"}});
        let payload = parse_task(&task, &SigningChannels::default()).unwrap();
        assert_eq!(payload.parent_task_artifacts_url, "500");
    }

    #[test]
    fn test_manifest_url_trims_slash() {
        let payload = TaskPayload {
            parent_task_artifacts_url: "https://example.com/artifacts/".to_string(),
            signing_cert: "nightly".to_string(),
        };
        assert_eq!(payload.manifest_url(), "https://example.com/artifacts/manifest.json");
    }
}
