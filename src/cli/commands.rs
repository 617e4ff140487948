//! CLI commands
//!
//! Handlers behind `screenflow list`, `schema` and `run`.

use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::{BridgeAgent, ComputerAgent, Script, ScriptedAgent};
use crate::core::Config;
use crate::workflow::{Session, WorkflowRegistry};

/// Options for `screenflow run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Workflow name
    pub workflow: String,
    /// Inline JSON payload
    pub payload: Option<String>,
    /// JSON payload file
    pub payload_file: Option<PathBuf>,
    /// `KEY=VALUE` string assignments
    pub set: Vec<String>,
    /// `KEY=JSON` typed assignments
    pub set_json: Vec<String>,
    /// Artifact directory override
    pub artifacts_dir: Option<PathBuf>,
    /// Use the scripted agent instead of the bridge
    pub simulate: bool,
    /// Script for the scripted agent
    pub script: Option<PathBuf>,
}

/// Render the workflow list
pub fn list(registry: &WorkflowRegistry) -> String {
    let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);

    let mut output = String::from("Available workflows:\n");
    for workflow in registry.iter() {
        output.push_str(&format!(
            "  {:<width$}  {}\n",
            workflow.name(),
            workflow.description(),
            width = width
        ));
    }
    output
}

/// Render the input schema of one workflow
pub fn schema(registry: &WorkflowRegistry, name: &str) -> anyhow::Result<String> {
    let workflow = registry
        .get(name)
        .with_context(|| format!("Unknown workflow '{}'", name))?;
    Ok(serde_json::to_string_pretty(&workflow.input_schema())?)
}

/// Run a workflow and return its output object
pub async fn run(
    config: &Config,
    registry: &WorkflowRegistry,
    opts: &RunOptions,
) -> anyhow::Result<Value> {
    if registry.get(&opts.workflow).is_none() {
        bail!(
            "Unknown workflow '{}'. Available: {}",
            opts.workflow,
            registry.names().join(", ")
        );
    }

    let payload = build_payload(opts)?;

    let agent: Arc<dyn ComputerAgent> = if opts.simulate {
        let script = match opts.script {
            Some(ref path) => Script::load(path)?,
            None => Script::default(),
        };
        Arc::new(ScriptedAgent::from_script(script))
    } else {
        Arc::new(BridgeAgent::from_config(config))
    };
    tracing::debug!("using {} agent", agent.name());

    let mut config = config.clone();
    if let Some(ref dir) = opts.artifacts_dir {
        config.artifacts.dir = dir.clone();
    }
    let session = Session::from_config(agent, &config);

    Ok(registry.run(&opts.workflow, &session, payload).await?)
}

/// Merge `--payload`/`--payload-file` with `--set` and `--set-json`
pub fn build_payload(opts: &RunOptions) -> anyhow::Result<Value> {
    let base = match (&opts.payload, &opts.payload_file) {
        (Some(_), Some(_)) => bail!("--payload and --payload-file are mutually exclusive"),
        (Some(inline), None) => {
            serde_json::from_str(inline).context("--payload is not valid JSON")?
        }
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", path.display()))?
        }
        (None, None) => Value::Object(Map::new()),
    };

    let mut payload = match base {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => bail!("payload must be a JSON object"),
    };

    for assignment in &opts.set {
        let (key, value) = split_assignment(assignment)?;
        payload.insert(key.to_string(), Value::String(value.to_string()));
    }

    for assignment in &opts.set_json {
        let (key, value) = split_assignment(assignment)?;
        let value: Value = serde_json::from_str(value)
            .with_context(|| format!("value of {} is not valid JSON", key))?;
        payload.insert(key.to_string(), value);
    }

    Ok(Value::Object(payload))
}

fn split_assignment(assignment: &str) -> anyhow::Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("expected KEY=VALUE, got '{}'", assignment),
    }
}
