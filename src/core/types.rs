//! Shared types used across screenflow modules

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result of a single workflow invocation
///
/// Serializes to one flat JSON object: `success`, optional `message` and
/// `error`, and the workflow-specific fields of `T` alongside them.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T = Empty> {
    /// Whether the workflow reached its final phase
    pub success: bool,
    /// Human-readable status message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Reason for failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Workflow-specific fields
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    /// Create a successful outcome carrying data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            error: None,
            data: Some(data),
        }
    }

    /// Create a failed outcome
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            data: None,
        }
    }

    /// Attach a status message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Outcome<Empty> {
    /// Create a successful outcome with only a message
    pub fn done(message: impl Into<String>) -> Self {
        Self::success(Empty {}).with_message(message)
    }
}

/// Output shape for workflows that report nothing beyond the message
#[derive(Debug, Clone, Default, Serialize)]
pub struct Empty {}

/// A credential that must never show up in logs
#[derive(Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for typing into a field
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
