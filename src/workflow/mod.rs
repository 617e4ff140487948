//! Workflow module - the contract every scripted workflow implements
//!
//! A workflow turns a typed, validated input into an `Outcome` by driving a
//! `Session`. `Runnable` erases the types so the registry and the CLI can
//! work with raw JSON payloads, and is where every failure is folded into a
//! `{success: false, error}` value.

pub mod artifacts;
pub mod registry;
pub mod session;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::core::{Outcome, Result};

pub use artifacts::ArtifactDir;
pub use registry::WorkflowRegistry;
pub use session::{Recovery, Session};

/// Input payload of a workflow
pub trait WorkflowInput: DeserializeOwned + JsonSchema + std::fmt::Debug + Send {
    /// Check required fields and normalize values after defaults are applied.
    /// The error message names the offending field.
    fn prepare(&mut self) -> std::result::Result<(), String>;
}

/// A scripted task against a computer-use agent
#[async_trait]
pub trait Workflow: Send + Sync {
    type Input: WorkflowInput;
    type Output: Serialize + Send;

    /// Registry name, e.g. `website-login`
    fn name(&self) -> &'static str;

    /// One-line description for `screenflow list`
    fn description(&self) -> &'static str;

    /// Execute the phases. Phase failures are returned as failed outcomes;
    /// `Err` is reserved for agent transport and I/O errors.
    async fn run(&self, session: &Session, input: Self::Input) -> Result<Outcome<Self::Output>>;
}

/// Type-erased workflow working on JSON payloads
#[async_trait]
pub trait Runnable: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the accepted payload
    fn input_schema(&self) -> Value;

    /// Run with a raw payload. Always returns a well-formed output object.
    async fn invoke(&self, session: &Session, payload: Value) -> Value;
}

#[async_trait]
impl<W> Runnable for W
where
    W: Workflow,
{
    fn name(&self) -> &'static str {
        Workflow::name(self)
    }

    fn description(&self) -> &'static str {
        Workflow::description(self)
    }

    fn input_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(W::Input)).unwrap_or(Value::Null)
    }

    async fn invoke(&self, session: &Session, payload: Value) -> Value {
        let name = Workflow::name(self);

        let outcome: Outcome<W::Output> = match parse_input::<W::Input>(payload) {
            Ok(input) => {
                tracing::info!(workflow = name, ?input, "starting workflow");
                match self.run(session, input).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::warn!(workflow = name, "aborted: {}", e);
                        Outcome::failure(e.to_string())
                    }
                }
            }
            Err(error) => {
                tracing::warn!(workflow = name, "rejected input: {}", error);
                Outcome::failure(error)
            }
        };

        match outcome.error {
            Some(ref error) => tracing::info!(workflow = name, "failed: {}", error),
            None => tracing::info!(workflow = name, "completed successfully"),
        }

        serde_json::to_value(&outcome).unwrap_or_else(|e| {
            json!({
                "success": false,
                "error": format!("Failed to serialize output: {}", e),
            })
        })
    }
}

/// Deserialize and prepare a payload; `null` counts as an empty object
pub fn parse_input<I: WorkflowInput>(payload: Value) -> std::result::Result<I, String> {
    let payload = match payload {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    let mut input: I =
        serde_json::from_value(payload).map_err(|e| format!("Invalid input: {}", e))?;
    input.prepare()?;
    Ok(input)
}

/// Fail unless `value` has non-whitespace content
pub fn require(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

/// Accept `https://host/path` or a bare `host/path` (https is assumed)
pub fn normalize_url(field: &str, raw: &str) -> std::result::Result<String, String> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    match url::Url::parse(&candidate) {
        Ok(parsed) if parsed.has_host() => Ok(candidate),
        _ => Err(format!("{} is not a valid URL: '{}'", field, raw)),
    }
}
