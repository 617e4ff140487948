//! Computer-use agent capability
//!
//! The small set of primitives every workflow is written against. Backends
//! decide how an instruction turns into clicks; workflows only see this trait.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::core::Result;

/// Trait for computer-use agent backends
#[async_trait]
pub trait ComputerAgent: Send + Sync {
    /// Issue a natural-language directive. Nothing is returned; the effect is
    /// observed through later `validate` calls.
    async fn act(&self, instruction: &str, max_iterations: Option<u32>) -> Result<()>;

    /// Poll the screen against a yes/no question until it holds or `timeout`
    /// elapses
    async fn validate(&self, question: &str, timeout: Duration) -> Result<bool>;

    /// Read structured data matching `schema` off the screen.
    /// `None` means the agent could not produce anything.
    async fn extract(&self, instruction: &str, schema: &Value) -> Result<Option<Value>>;

    /// Type text into whatever has focus
    async fn type_text(&self, text: &str, interval: Option<Duration>) -> Result<()>;

    /// Press a single named key (e.g. "Return", "Escape")
    async fn press(&self, key: &str) -> Result<()>;

    /// Get the backend name
    fn name(&self) -> &str;
}
