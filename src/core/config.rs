//! Configuration management for screenflow
//!
//! Supports environment variables, a `.env` file, a TOML config file and
//! command-line overrides.
//!
//! Config file location: ~/.config/screenflow/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{Result, ScreenflowError};

/// Main configuration for screenflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Agent bridge configuration
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Artifact directory configuration
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Timeouts and typing cadence
    #[serde(default)]
    pub timing: TimingConfig,
}

/// External agent bridge process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Executable that speaks the JSON bridge protocol
    pub command: String,
    /// Extra arguments passed before every request
    #[serde(default)]
    pub args: Vec<String>,
    /// Session name forwarded with every request
    pub session_name: String,
    /// Upper bound for act/type/press/extract calls, in seconds
    pub action_timeout_secs: u64,
    /// Slack added on top of a validate timeout before the child is killed
    pub grace_secs: u64,
    /// API key handed to the bridge (never written to the config file)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Deployment id handed to the bridge (never written to the config file)
    #[serde(default, skip_serializing)]
    pub deployment_id: Option<String>,
}

/// Where downloads and extracted results land
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Artifact directory (default: /artifacts)
    pub dir: PathBuf,
}

/// Timing knobs shared by every workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Timeout used by checkpoints that don't name one
    /// Default: 30
    pub validate_timeout_secs: u64,
    /// Per-character interval for ordinary fields; unset means the agent default
    #[serde(default)]
    pub typing_interval_ms: Option<u64>,
    /// Per-character interval for password fields
    /// Default: 10
    pub secret_typing_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: env::var("SCREENFLOW_BRIDGE")
                .unwrap_or_else(|_| "screenflow-bridge".to_string()),
            args: Vec::new(),
            session_name: env::var("SCREENFLOW_SESSION")
                .unwrap_or_else(|_| "screenflow".to_string()),
            action_timeout_secs: 300,
            grace_secs: 5,
            api_key: non_empty_env("SCREENFLOW_API_KEY"),
            deployment_id: non_empty_env("SCREENFLOW_DEPLOYMENT_ID"),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: env::var("SCREENFLOW_ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/artifacts")),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            validate_timeout_secs: env::var("SCREENFLOW_VALIDATE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            typing_interval_ms: None,
            secret_typing_interval_ms: 10,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("screenflow")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        match Self::load_from(&Self::config_file()) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScreenflowError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ScreenflowError::config(format!("Failed to read config: {}", e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ScreenflowError::config(format!("Failed to parse config: {}", e)))?;

        // Secrets only ever come from the environment
        config.bridge.api_key = non_empty_env("SCREENFLOW_API_KEY");
        config.bridge.deployment_id = non_empty_env("SCREENFLOW_DEPLOYMENT_ID");

        Ok(config)
    }

    /// Save configuration to the default file and return the path
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_file();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                ScreenflowError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenflowError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| ScreenflowError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Timeout for checkpoints that don't specify their own
    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.validate_timeout_secs)
    }

    /// Typing interval for ordinary fields
    pub fn typing_interval(&self) -> Option<Duration> {
        self.timing.typing_interval_ms.map(Duration::from_millis)
    }

    /// Typing interval for password fields
    pub fn secret_typing_interval(&self) -> Duration {
        Duration::from_millis(self.timing.secret_typing_interval_ms)
    }
}
