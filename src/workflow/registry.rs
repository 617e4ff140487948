//! Workflow registry - looks up workflows by name and dispatches payloads

use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::{Result, ScreenflowError};
use crate::workflow::{Runnable, Session};
use crate::workflows;

/// Registry of available workflows
pub struct WorkflowRegistry {
    /// Workflows indexed by name, sorted for listing
    workflows: BTreeMap<&'static str, Box<dyn Runnable>>,
}

impl WorkflowRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            workflows: BTreeMap::new(),
        }
    }

    /// Create a registry with every bundled workflow
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(workflows::SdkPrimitives);
        registry.register(workflows::IntegrationCheck);
        registry.register(workflows::WebsiteLogin);
        registry.register(workflows::CustomWebsiteLogin);
        registry.register(workflows::EzyvetLogin);
        registry.register(workflows::DownloadDocuments);
        registry.register(workflows::GetAppointments);
        registry
    }

    /// Register a workflow, replacing any with the same name
    pub fn register(&mut self, workflow: impl Runnable + 'static) {
        self.workflows.insert(workflow.name(), Box::new(workflow));
    }

    /// Get a workflow by name
    pub fn get(&self, name: &str) -> Option<&dyn Runnable> {
        self.workflows.get(name).map(|w| w.as_ref())
    }

    /// Names of all registered workflows
    pub fn names(&self) -> Vec<&'static str> {
        self.workflows.keys().copied().collect()
    }

    /// Iterate over registered workflows in name order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Runnable> {
        self.workflows.values().map(|w| w.as_ref())
    }

    /// Number of registered workflows
    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    /// Run a workflow by name
    pub async fn run(&self, name: &str, session: &Session, payload: Value) -> Result<Value> {
        let workflow = self
            .get(name)
            .ok_or_else(|| ScreenflowError::UnknownWorkflow(name.to_string()))?;
        Ok(workflow.invoke(session, payload).await)
    }
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
