//! Scripted agent - an in-process stand-in for a real computer-use backend
//!
//! Answers validations and extractions from queues, records every call, and
//! can run hooks when an instruction matches. Used by tests and by
//! `screenflow run --simulate`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::agent::traits::ComputerAgent;
use crate::core::{Result, ScreenflowError};

/// A primitive call observed by the scripted agent
#[derive(Debug, Clone, PartialEq)]
pub enum AgentCall {
    Act {
        instruction: String,
        max_iterations: Option<u32>,
    },
    Validate {
        question: String,
        timeout: Duration,
    },
    Extract {
        instruction: String,
        schema: Value,
    },
    Type {
        text: String,
        interval: Option<Duration>,
    },
    Press {
        key: String,
    },
}

/// Script file accepted by `--script`
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Answer once `validations` runs dry
    #[serde(default = "default_validation")]
    pub default_validation: bool,
    /// Validation answers in call order
    #[serde(default)]
    pub validations: Vec<bool>,
    /// Extraction results in call order (`null` = nothing extracted)
    #[serde(default)]
    pub extractions: Vec<Value>,
}

fn default_validation() -> bool {
    true
}

impl Default for Script {
    fn default() -> Self {
        Self {
            default_validation: true,
            validations: Vec::new(),
            extractions: Vec::new(),
        }
    }
}

impl Script {
    /// Load a script from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ScreenflowError::config(format!("Invalid script {}: {}", path.display(), e))
        })
    }
}

type Hook = Box<dyn Fn(&str) + Send + Sync>;

/// Agent backend driven by a script instead of a screen
pub struct ScriptedAgent {
    default_validation: bool,
    validations: Mutex<VecDeque<bool>>,
    extractions: Mutex<VecDeque<Option<Value>>>,
    hooks: Vec<(String, Hook)>,
    calls: Mutex<Vec<AgentCall>>,
}

impl ScriptedAgent {
    /// Create an agent that answers every validation with `true`
    pub fn new() -> Self {
        Self::from_script(Script::default())
    }

    /// Create an agent from a script
    pub fn from_script(script: Script) -> Self {
        Self {
            default_validation: script.default_validation,
            validations: Mutex::new(script.validations.into()),
            extractions: Mutex::new(
                script
                    .extractions
                    .into_iter()
                    .map(|v| if v.is_null() { None } else { Some(v) })
                    .collect(),
            ),
            hooks: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer for validations once the queue is empty
    pub fn with_default_validation(mut self, answer: bool) -> Self {
        self.default_validation = answer;
        self
    }

    /// Queue validation answers, consumed in call order
    pub fn with_validations(self, answers: impl IntoIterator<Item = bool>) -> Self {
        lock(&self.validations).extend(answers);
        self
    }

    /// Queue an extraction result
    pub fn with_extraction(self, result: Option<Value>) -> Self {
        lock(&self.extractions).push_back(result);
        self
    }

    /// Run `hook` whenever an instruction contains `pattern` (case-insensitive)
    pub fn on_act(mut self, pattern: &str, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hooks.push((pattern.to_lowercase(), Box::new(hook)));
        self
    }

    /// All calls recorded so far
    pub fn calls(&self) -> Vec<AgentCall> {
        lock(&self.calls).clone()
    }

    /// Instructions passed to `act`, in order
    pub fn instructions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AgentCall::Act { instruction, .. } => Some(instruction),
                _ => None,
            })
            .collect()
    }

    /// Questions passed to `validate`, in order
    pub fn questions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AgentCall::Validate { question, .. } => Some(question),
                _ => None,
            })
            .collect()
    }

    /// Text passed to `type_text` with its interval
    pub fn typed(&self) -> Vec<(String, Option<Duration>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AgentCall::Type { text, interval } => Some((text, interval)),
                _ => None,
            })
            .collect()
    }

    /// Number of `extract` calls
    pub fn extraction_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, AgentCall::Extract { .. }))
            .count()
    }

    fn record(&self, call: AgentCall) {
        lock(&self.calls).push(call);
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ComputerAgent for ScriptedAgent {
    async fn act(&self, instruction: &str, max_iterations: Option<u32>) -> Result<()> {
        tracing::debug!(instruction, ?max_iterations, "scripted act");
        self.record(AgentCall::Act {
            instruction: instruction.to_string(),
            max_iterations,
        });

        let lowered = instruction.to_lowercase();
        for (pattern, hook) in &self.hooks {
            if lowered.contains(pattern.as_str()) {
                hook(instruction);
            }
        }
        Ok(())
    }

    async fn validate(&self, question: &str, timeout: Duration) -> Result<bool> {
        self.record(AgentCall::Validate {
            question: question.to_string(),
            timeout,
        });
        let answer = lock(&self.validations)
            .pop_front()
            .unwrap_or(self.default_validation);
        tracing::debug!(question, answer, "scripted validate");
        Ok(answer)
    }

    async fn extract(&self, instruction: &str, schema: &Value) -> Result<Option<Value>> {
        self.record(AgentCall::Extract {
            instruction: instruction.to_string(),
            schema: schema.clone(),
        });
        Ok(lock(&self.extractions).pop_front().flatten())
    }

    async fn type_text(&self, text: &str, interval: Option<Duration>) -> Result<()> {
        self.record(AgentCall::Type {
            text: text.to_string(),
            interval,
        });
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<()> {
        self.record(AgentCall::Press {
            key: key.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_validations_then_default() {
        let agent = ScriptedAgent::new()
            .with_default_validation(false)
            .with_validations([true]);

        let first = tokio_test::block_on(agent.validate("a?", Duration::from_secs(1))).unwrap();
        let second = tokio_test::block_on(agent.validate("b?", Duration::from_secs(1))).unwrap();
        assert!(first);
        assert!(!second);
        assert_eq!(agent.questions(), vec!["a?", "b?"]);
    }

    #[test]
    fn test_extractions_in_order() {
        let agent = ScriptedAgent::new().with_extraction(Some(json!({"title": "Hello"})));
        let schema = json!({"type": "object"});

        let first = tokio_test::block_on(agent.extract("title?", &schema)).unwrap();
        let second = tokio_test::block_on(agent.extract("title?", &schema)).unwrap();
        assert_eq!(first, Some(json!({"title": "Hello"})));
        assert_eq!(second, None);
        assert_eq!(agent.extraction_count(), 2);
    }

    #[test]
    fn test_hooks_fire_on_matching_instruction() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let agent = ScriptedAgent::new().on_act("download", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio_test::block_on(agent.act("Open Firefox", None)).unwrap();
        tokio_test::block_on(agent.act("Click each Download button", Some(30))).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(agent.instructions().len(), 2);
    }

    #[test]
    fn test_script_from_json() {
        let script: Script = serde_json::from_value(json!({
            "validations": [true, false],
            "extractions": [null, {"title": "x"}]
        }))
        .unwrap();
        assert!(script.default_validation);

        let agent = ScriptedAgent::from_script(script);
        let schema = json!({});
        assert_eq!(tokio_test::block_on(agent.extract("?", &schema)).unwrap(), None);
        assert_eq!(
            tokio_test::block_on(agent.extract("?", &schema)).unwrap(),
            Some(json!({"title": "x"}))
        );
    }
}
