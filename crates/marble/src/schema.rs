//! Explicit parser for vendor response bodies.
//!
//! The vendor has renamed fields between API revisions (`media_id` vs
//! `id`, `world_id` vs `id`, ...). Each value we read is described by a
//! [`FieldSchema`] listing the accepted field names in priority order.
//! When none of them is present the parser returns a [`SchemaError`]
//! carrying the raw body instead of guessing.

use serde_json::Value;
use tourforge_core::job::{clamp_progress, JobStatus};

/// Accepted field names for one value, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// Human-readable name used in error messages.
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Id returned by `POST /media`.
pub const MEDIA_ID: FieldSchema = FieldSchema {
    name: "media id",
    fields: &["media_id", "media_asset_id", "id"],
};

/// Id returned by `POST /worlds/generate`.
pub const OPERATION_ID: FieldSchema = FieldSchema {
    name: "operation id",
    fields: &["operation_id", "id"],
};

/// World id inside a finished operation's `response`.
pub const WORLD_ID: FieldSchema = FieldSchema {
    name: "world id",
    fields: &["world_id", "id"],
};

/// Canonical viewer URL inside world metadata.
pub const VIEWER_URL: FieldSchema = FieldSchema {
    name: "viewer url",
    fields: &["world_marble_url", "marble_url"],
};

/// Progress percentage inside an operation's `metadata`.
pub const PROGRESS: FieldSchema = FieldSchema {
    name: "progress",
    fields: &["progress_pct", "progress"],
};

/// A vendor body did not have the expected shape.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Malformed vendor response ({context}): {reason}")]
pub struct SchemaError {
    /// Which response was being parsed, e.g. `"operation status"`.
    pub context: &'static str,
    pub reason: String,
    /// Raw body, kept for diagnostics.
    pub body: String,
}

impl SchemaError {
    fn new(context: &'static str, reason: impl Into<String>, value: &Value) -> Self {
        Self {
            context,
            reason: reason.into(),
            body: value.to_string(),
        }
    }

    /// A 2xx body that could not be decoded as JSON at all.
    pub fn not_json(context: &'static str, raw: impl Into<String>, cause: &serde_json::Error) -> Self {
        Self {
            context,
            reason: format!("body is not valid JSON: {cause}"),
            body: raw.into(),
        }
    }
}

impl FieldSchema {
    /// First accepted field holding a non-empty string (or a number,
    /// rendered as a string).
    pub fn find(&self, value: &Value) -> Option<String> {
        self.fields.iter().find_map(|field| match value.get(*field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Like [`find`](Self::find) but fails with a [`SchemaError`].
    pub fn require(&self, value: &Value, context: &'static str) -> Result<String, SchemaError> {
        self.find(value).ok_or_else(|| {
            SchemaError::new(
                context,
                format!("missing {} (expected one of: {})", self.name, self.fields.join(", ")),
                value,
            )
        })
    }

    /// First accepted field holding a number or numeric string.
    pub fn find_f64(&self, value: &Value) -> Option<f64> {
        self.fields.iter().find_map(|field| match value.get(*field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// Parse the body of `POST /media`.
pub fn parse_media_id(value: &Value) -> Result<String, SchemaError> {
    MEDIA_ID.require(value, "media upload")
}

/// Parse the body of `POST /worlds/generate`.
pub fn parse_operation_id(value: &Value) -> Result<String, SchemaError> {
    OPERATION_ID.require(value, "world generation")
}

/// Parse the body of `GET /operations/{id}`.
///
/// A missing `done` flag reads as "still running".
pub fn parse_operation(value: &Value) -> Result<JobStatus, SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::new(
            "operation status",
            "expected a JSON object",
            value,
        ));
    }

    let done = match value.get("done") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(done)) => *done,
        Some(_) => {
            return Err(SchemaError::new(
                "operation status",
                "`done` is not a boolean",
                value,
            ))
        }
    };

    let progress_percent = value
        .get("metadata")
        .and_then(|metadata| PROGRESS.find_f64(metadata))
        .map(clamp_progress);

    Ok(JobStatus {
        done,
        progress_percent,
        error: non_null(value.get("error")),
        response: non_null(value.get("response")),
    })
}

/// Extract the world id from a finished operation's `response`.
pub fn parse_world_id(response: &Value) -> Result<String, SchemaError> {
    WORLD_ID.require(response, "operation result")
}

/// Extract the canonical viewer URL from `GET /worlds/{id}`.
///
/// Looks at the top level first, then inside a nested `world` object.
pub fn parse_viewer_url(world: &Value) -> Option<String> {
    VIEWER_URL
        .find(world)
        .or_else(|| world.get("world").and_then(|inner| VIEWER_URL.find(inner)))
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}
