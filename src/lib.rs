//! screenflow - natural-language browser automation workflows
//!
//! Each workflow is a short linear script against a computer-use agent:
//! open a browser, click and type through a site, check the screen with
//! yes/no questions, and optionally extract structured data.
//!
//! # Architecture
//!
//! - **Core**: Configuration, error handling and the `Outcome` value type
//! - **Agent**: The `ComputerAgent` capability plus bridge and scripted backends
//! - **Workflow**: The workflow contract, session handle, artifacts and registry
//! - **Workflows**: The bundled workflows
//! - **CLI**: Command handlers for the binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use screenflow::{Config, ScriptedAgent, Session, WorkflowRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let session = Session::from_config(Arc::new(ScriptedAgent::new()), &config);
//!     let registry = WorkflowRegistry::new();
//!
//!     let output = registry
//!         .run("integration-check", &session, serde_json::json!({}))
//!         .await
//!         .unwrap();
//!     println!("{}", output);
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod workflow;
pub mod workflows;

// Re-export commonly used items
pub use agent::{BridgeAgent, ComputerAgent, ScriptedAgent};
pub use core::{Config, Outcome, Result, ScreenflowError, Secret};
pub use workflow::{Runnable, Session, Workflow, WorkflowRegistry};
