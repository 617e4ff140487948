//! Custom error types for screenflow
//!
//! Everything that can go wrong below the workflow runner ends up here. The
//! runner folds these into a failed `Outcome`, so callers never see them.

use thiserror::Error;

/// Main error type for screenflow operations
#[derive(Error, Debug)]
pub enum ScreenflowError {
    /// The computer-use agent reported a failure or misbehaved
    #[error("Agent error: {0}")]
    Agent(String),

    /// Payload could not be turned into a workflow input
    #[error("Invalid input: {0}")]
    Input(String),

    /// Artifact directory errors
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bridge executable missing from PATH
    #[error("agent bridge '{0}' not found. Set SCREENFLOW_BRIDGE or bridge.command in the config file")]
    BridgeNotFound(String),

    /// Workflow name not in the registry
    #[error("Unknown workflow '{0}'. Run `screenflow list` to see available workflows")]
    UnknownWorkflow(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for screenflow operations
pub type Result<T> = std::result::Result<T, ScreenflowError>;

impl ScreenflowError {
    /// Create an agent error
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create an artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
