use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Structural defects in a task definition.
///
/// Every variant is a missing or uninterpretable required field. A cert that
/// is a string but not an allowed channel is not an error; see
/// [`verify_task_schema`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("task definition has no 'payload' object")]
    MissingPayload,
    #[error("payload is missing 'parent_task_artifacts_url'")]
    MissingArtifactsUrl,
    #[error("payload is missing 'signing_cert'")]
    MissingSigningCert,
    #[error("payload 'signing_cert' must be a string, got {0}")]
    InvalidSigningCert(String),
}

impl SchemaError {
    /// Name of the offending payload key
    pub fn key(&self) -> &'static str {
        match self {
            SchemaError::MissingPayload => "payload",
            SchemaError::MissingArtifactsUrl => "parent_task_artifacts_url",
            SchemaError::MissingSigningCert | SchemaError::InvalidSigningCert(_) => "signing_cert",
        }
    }
}

/// Signing channels a task may be signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningChannels(BTreeSet<String>);

impl SigningChannels {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(channels.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.0.contains(channel)
    }
}

impl Default for SigningChannels {
    fn default() -> Self {
        Self::new(["nightly", "release", "dep"])
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `null`, `""`, `[]` and `{}` do not count as a supplied value
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Check the required payload fields of a task definition.
///
/// - `Err(_)` when a required key is absent or empty, or `signing_cert` is not a string
/// - `Ok(false)` when `signing_cert` names a channel outside `channels`
/// - `Ok(true)` otherwise
pub fn verify_task_schema(task: &Value, channels: &SigningChannels) -> Result<bool, SchemaError> {
    let payload = task
        .get("payload")
        .and_then(Value::as_object)
        .ok_or(SchemaError::MissingPayload)?;

    if payload
        .get("parent_task_artifacts_url")
        .is_none_or(is_empty_value)
    {
        return Err(SchemaError::MissingArtifactsUrl);
    }

    let cert = match payload.get("signing_cert") {
        None | Some(Value::Null) => return Err(SchemaError::MissingSigningCert),
        Some(Value::String(cert)) => cert,
        Some(other) => {
            return Err(SchemaError::InvalidSigningCert(
                json_type_name(other).to_string(),
            ));
        }
    };

    if !channels.contains(cert) {
        tracing::warn!(signing_cert = %cert, "Signing cert is not an allowed channel");
        return Ok(false);
    }

    Ok(true)
}

/// [`verify_task_schema`] against the default channel allow-list
pub fn verify_task_schema_default(task: &Value) -> Result<bool, SchemaError> {
    verify_task_schema(task, &SigningChannels::default())
}
