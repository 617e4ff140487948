//! Bridge agent - forwards primitives to an external driver process
//!
//! Every primitive spawns the bridge command once, writes a single JSON
//! request on stdin and reads a single JSON response from stdout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::agent::traits::ComputerAgent;
use crate::core::{Config, Result, ScreenflowError};

/// Agent backend that talks to a bridge executable
#[derive(Debug, Clone)]
pub struct BridgeAgent {
    /// Bridge executable
    command: String,
    /// Arguments placed before every request
    args: Vec<String>,
    /// Session name for isolation
    session_name: String,
    /// Deadline for everything except validate
    action_timeout: Duration,
    /// Slack on top of a validate timeout
    grace: Duration,
    /// Extra environment for the child
    env: Vec<(String, String)>,
}

/// One primitive, tagged by `op` on the wire
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum BridgeOp<'a> {
    Act {
        instruction: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_iterations: Option<u32>,
    },
    Validate {
        question: &'a str,
        timeout: f64,
    },
    Extract {
        instruction: &'a str,
        schema: &'a Value,
    },
    Type {
        text: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        interval: Option<f64>,
    },
    Press {
        key: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    session: &'a str,
    #[serde(flatten)]
    op: BridgeOp<'a>,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl BridgeAgent {
    /// Create a new bridge agent for `command`
    pub fn new(command: impl Into<String>, session_name: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            session_name: session_name.into(),
            action_timeout: Duration::from_secs(300),
            grace: Duration::from_secs(5),
            env: Vec::new(),
        }
    }

    /// Build a bridge agent from configuration
    pub fn from_config(config: &Config) -> Self {
        let bridge = &config.bridge;
        let mut agent = Self::new(&bridge.command, &bridge.session_name)
            .with_args(bridge.args.clone())
            .with_action_timeout(Duration::from_secs(bridge.action_timeout_secs))
            .with_grace(Duration::from_secs(bridge.grace_secs));

        if let Some(ref key) = bridge.api_key {
            agent.env.push(("SCREENFLOW_API_KEY".to_string(), key.clone()));
        }
        if let Some(ref id) = bridge.deployment_id {
            agent
                .env
                .push(("SCREENFLOW_DEPLOYMENT_ID".to_string(), id.clone()));
        }

        agent
    }

    /// Set arguments passed before every request
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set the deadline for non-validate primitives
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Set the slack allowed on top of a validate timeout
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Check if the bridge executable can be launched
    pub async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .args(&self.args)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Send one request. `Ok(None)` means the deadline passed first.
    async fn exchange(&self, op: BridgeOp<'_>, deadline: Duration) -> Result<Option<Value>> {
        let request = BridgeRequest {
            session: &self.session_name,
            op,
        };
        let mut payload = serde_json::to_vec(&request)?;
        payload.push(b'\n');

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScreenflowError::BridgeNotFound(self.command.clone())
            } else {
                ScreenflowError::agent(format!("Failed to run {}: {}", self.command, e))
            }
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
            // dropping stdin closes the pipe so the bridge sees EOF
        }

        let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!(
                    "bridge {} did not answer within {:?}",
                    self.command,
                    deadline
                );
                return Ok(None);
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScreenflowError::agent(format!(
                "bridge command failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| ScreenflowError::agent("bridge produced no response"))?;

        let response: BridgeResponse = serde_json::from_str(line.trim()).map_err(|e| {
            ScreenflowError::agent(format!("malformed bridge response '{}': {}", line, e))
        })?;

        if response.ok {
            Ok(Some(response.result))
        } else {
            Err(ScreenflowError::agent(
                response
                    .error
                    .unwrap_or_else(|| "bridge reported failure".to_string()),
            ))
        }
    }

    /// Send a request that must finish within the action timeout
    async fn exchange_action(&self, op: BridgeOp<'_>) -> Result<Value> {
        self.exchange(op, self.action_timeout).await?.ok_or_else(|| {
            ScreenflowError::agent(format!(
                "bridge timed out after {}s",
                self.action_timeout.as_secs()
            ))
        })
    }
}

#[async_trait]
impl ComputerAgent for BridgeAgent {
    async fn act(&self, instruction: &str, max_iterations: Option<u32>) -> Result<()> {
        self.exchange_action(BridgeOp::Act {
            instruction,
            max_iterations,
        })
        .await?;
        Ok(())
    }

    async fn validate(&self, question: &str, timeout: Duration) -> Result<bool> {
        let op = BridgeOp::Validate {
            question,
            timeout: timeout.as_secs_f64(),
        };

        match self.exchange(op, timeout.saturating_add(self.grace)).await? {
            Some(Value::Bool(answer)) => Ok(answer),
            Some(other) => Err(ScreenflowError::agent(format!(
                "bridge returned non-boolean validation result: {}",
                other
            ))),
            None => Ok(false),
        }
    }

    async fn extract(&self, instruction: &str, schema: &Value) -> Result<Option<Value>> {
        let result = self
            .exchange_action(BridgeOp::Extract {
                instruction,
                schema,
            })
            .await?;

        Ok(match result {
            Value::Null => None,
            value => Some(value),
        })
    }

    async fn type_text(&self, text: &str, interval: Option<Duration>) -> Result<()> {
        self.exchange_action(BridgeOp::Type {
            text,
            interval: interval.map(|d| d.as_secs_f64()),
        })
        .await?;
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<()> {
        self.exchange_action(BridgeOp::Press { key }).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "bridge"
    }
}
