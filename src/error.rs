//! Error types for event construction, decoding, and encoding.

use crate::pointer::JsonPointer;
use thiserror::Error;

/// Raised when an event is built with an invalid attribute combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("specversion must not be empty")]
    EmptySpecVersion,
    #[error("type must not be empty")]
    EmptyType,
    #[error("datacontenttype must not be empty")]
    EmptyDataContentType,
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("data and data_base64 must not both be present")]
    DataConflict,
}

/// Error type for JSON to event conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A JSON value could not be converted to its target type.
    #[error("Error decoding {value} as {target}{}: {message}", location(.path))]
    Type {
        /// Location of `value` in the document.
        path: JsonPointer,
        /// For a standard attribute, the attribute's own type (`uuid::Uuid`
        /// for `/id`). For a failure inside the payload or the extension, the
        /// payload or extension type being decoded, not the leaf field's
        /// type: `/data/accountId` reports the payload struct, and the serde
        /// message names what the leaf expected.
        target: String,
        /// JSON rendering of the value found at `path`.
        value: String,
        message: String,
    },
    #[error("Required field '{field}' is missing{}", location(.path))]
    MissingField { field: String, path: JsonPointer },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DecodeError {
    /// Build a type error for the value found at `path`.
    pub fn type_error(
        path: JsonPointer,
        target: impl Into<String>,
        value: &serde_json::Value,
        message: impl Into<String>,
    ) -> Self {
        DecodeError::Type {
            path,
            target: target.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// The JSON pointer of the offending value, if the error has one.
    pub fn path(&self) -> Option<&JsonPointer> {
        match self {
            DecodeError::Type { path, .. } | DecodeError::MissingField { path, .. } => Some(path),
            DecodeError::Validation(_) => None,
        }
    }

    /// Re-root the error under `key`, used when a nested value was decoded
    /// on its own.
    pub fn within(self, key: &str) -> Self {
        match self {
            DecodeError::Type { path, target, value, message } => DecodeError::Type {
                path: path.prefixed(key),
                target,
                value,
                message,
            },
            DecodeError::MissingField { field, path } => DecodeError::MissingField {
                field,
                path: path.prefixed(key),
            },
            other => other,
        }
    }
}

fn location(path: &JsonPointer) -> String {
    if path.is_root() {
        String::new()
    } else {
        format!(" at {}", path)
    }
}

/// Error type for event to JSON conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("extension must serialize to an object, got {kind}")]
    ExtensionNotObject { kind: &'static str },
    #[error("extension attribute '{key}' shadows a standard attribute")]
    ReservedExtensionKey { key: String },
    #[error("Failed to serialize {target}: {message}")]
    Serialize { target: String, message: String },
}

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Umbrella error for the string-level entry points.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
