//! Session handle passed into every workflow invocation
//!
//! Wraps the agent with the timing defaults and artifact directory of one
//! browser session, and logs each primitive as it goes out.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::ComputerAgent;
use crate::core::{Config, Result, Secret};
use crate::workflow::artifacts::ArtifactDir;

/// A single bounded recovery attempt for a failed checkpoint
#[derive(Debug, Clone, Copy)]
pub struct Recovery<'a> {
    /// Instruction issued after the first failed check
    pub instruction: &'a str,
    /// Iteration budget for the recovery instruction
    pub max_iterations: u32,
    /// Timeout for the second and last check
    pub retry_timeout: Duration,
}

/// Explicit context for one workflow run against one browser session
pub struct Session {
    agent: Arc<dyn ComputerAgent>,
    artifacts: ArtifactDir,
    validate_timeout: Duration,
    typing_interval: Option<Duration>,
    secret_interval: Duration,
}

impl Session {
    /// Create a session with default timing
    pub fn new(agent: Arc<dyn ComputerAgent>, artifacts: ArtifactDir) -> Self {
        Self {
            agent,
            artifacts,
            validate_timeout: Duration::from_secs(30),
            typing_interval: None,
            secret_interval: Duration::from_millis(10),
        }
    }

    /// Create a session using the configured artifact directory and timing
    pub fn from_config(agent: Arc<dyn ComputerAgent>, config: &Config) -> Self {
        Self {
            agent,
            artifacts: ArtifactDir::new(&config.artifacts.dir),
            validate_timeout: config.validate_timeout(),
            typing_interval: config.typing_interval(),
            secret_interval: config.secret_typing_interval(),
        }
    }

    /// Override the timeout used by `check_default`
    pub fn with_validate_timeout(mut self, timeout: Duration) -> Self {
        self.validate_timeout = timeout;
        self
    }

    pub fn agent(&self) -> &dyn ComputerAgent {
        self.agent.as_ref()
    }

    pub fn artifacts(&self) -> &ArtifactDir {
        &self.artifacts
    }

    /// Issue an instruction with the agent's own iteration budget
    pub async fn act(&self, instruction: &str) -> Result<()> {
        tracing::debug!(instruction, "act");
        self.agent.act(instruction, None).await
    }

    /// Issue an instruction with an explicit iteration budget
    pub async fn act_within(&self, instruction: &str, max_iterations: u32) -> Result<()> {
        tracing::debug!(instruction, max_iterations, "act");
        self.agent.act(instruction, Some(max_iterations)).await
    }

    /// Checkpoint: does `question` hold within `timeout`?
    pub async fn check(&self, question: &str, timeout: Duration) -> Result<bool> {
        let passed = self.agent.validate(question, timeout).await?;
        tracing::debug!(question, passed, "checkpoint");
        Ok(passed)
    }

    /// Checkpoint with the session's default timeout
    pub async fn check_default(&self, question: &str) -> Result<bool> {
        self.check(question, self.validate_timeout).await
    }

    /// Checkpoint that gets one recovery action and one re-check before
    /// reporting failure
    pub async fn check_with_recovery(
        &self,
        question: &str,
        timeout: Duration,
        recovery: Recovery<'_>,
    ) -> Result<bool> {
        if self.check(question, timeout).await? {
            return Ok(true);
        }

        tracing::info!(question, "checkpoint failed, attempting recovery");
        self.act_within(recovery.instruction, recovery.max_iterations)
            .await?;
        self.check(question, recovery.retry_timeout).await
    }

    /// Type into the focused field
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.agent.type_text(text, self.typing_interval).await
    }

    /// Type a credential using the slower secret interval
    pub async fn type_secret(&self, secret: &Secret) -> Result<()> {
        tracing::debug!(?secret, "typing secret");
        self.agent
            .type_text(secret.expose(), Some(self.secret_interval))
            .await
    }

    /// Press a named key
    pub async fn press(&self, key: &str) -> Result<()> {
        self.agent.press(key).await
    }

    /// One-shot structured read; empty objects count as nothing extracted
    pub async fn extract(&self, instruction: &str, schema: &Value) -> Result<Option<Value>> {
        let extracted = self.agent.extract(instruction, schema).await?;
        Ok(extracted.filter(|value| !is_empty(value)))
    }

    /// Type `url` into the address bar after `focus_instruction` and submit
    pub async fn enter_url(&self, focus_instruction: &str, url: &str) -> Result<()> {
        self.act(focus_instruction).await?;
        self.type_text(url).await?;
        self.press("Return").await
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
