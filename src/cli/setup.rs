//! `screenflow init` and `screenflow doctor`
//!
//! First-run scaffolding and an environment check that reports what is
//! missing before a workflow fails halfway through.

use std::fs;
use std::path::Path;

use crate::agent::BridgeAgent;
use crate::core::Config;

const ENV_TEMPLATE: &str = "# screenflow agent credentials
# Forwarded to the agent bridge process on every call

SCREENFLOW_API_KEY=
SCREENFLOW_DEPLOYMENT_ID=

# Bridge executable (defaults to screenflow-bridge on PATH)
# SCREENFLOW_BRIDGE=
";

const CREDENTIAL_KEYS: [&str; 2] = ["SCREENFLOW_API_KEY", "SCREENFLOW_DEPLOYMENT_ID"];

/// Severity of a doctor finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

/// One line of the doctor report
#[derive(Debug, Clone)]
pub struct Check {
    pub label: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(label: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            label,
            status,
            detail: detail.into(),
        }
    }
}

/// Create `.env`, the config file and the artifact directory if missing
pub fn init(config: &Config, env_path: &Path) -> anyhow::Result<()> {
    println!("Setting up screenflow...\n");

    if env_path.exists() {
        println!("✓ {} already exists", env_path.display());
    } else {
        fs::write(env_path, ENV_TEMPLATE)?;
        println!("✓ Created {}", env_path.display());
        println!("  → add SCREENFLOW_API_KEY and SCREENFLOW_DEPLOYMENT_ID");
    }

    if Config::config_exists() {
        println!("✓ Config file already exists at {}", Config::config_file().display());
    } else {
        let path = config.save()?;
        println!("✓ Wrote default config to {}", path.display());
    }

    match fs::create_dir_all(&config.artifacts.dir) {
        Ok(()) => println!("✓ Artifact directory {}", config.artifacts.dir.display()),
        Err(e) => println!(
            "⚠ Could not create artifact directory {}: {}",
            config.artifacts.dir.display(),
            e
        ),
    }

    println!("\nNext steps:");
    println!("  1. Fill in the credentials in {}", env_path.display());
    println!("  2. Point bridge.command at your agent bridge");
    println!("  3. Run `screenflow doctor`");
    println!("  4. Try `screenflow run integration-check`");
    Ok(())
}

/// Run every environment check
pub async fn run_checks(config: &Config, env_path: &Path) -> Vec<Check> {
    vec![
        check_credentials(config, env_path),
        check_config_file(),
        check_bridge(config).await,
        check_artifacts(&config.artifacts.dir),
    ]
}

/// Print the doctor report; returns false if any check is an error
pub async fn doctor(config: &Config, env_path: &Path) -> bool {
    println!("Verifying screenflow setup...\n");

    let checks = run_checks(config, env_path).await;
    for check in &checks {
        let marker = match check.status {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning => "⚠",
            CheckStatus::Error => "✗",
        };
        println!("{} {:<12} {}", marker, check.label, check.detail);
    }

    println!("\n───────────────────────────────────────────");
    let has_errors = checks.iter().any(|c| c.status == CheckStatus::Error);
    let has_warnings = checks.iter().any(|c| c.status == CheckStatus::Warning);

    if has_errors {
        println!("Setup has errors that must be fixed");
    } else if has_warnings {
        println!("Setup is mostly complete but has warnings");
    } else {
        println!("All checks passed");
    }

    !has_errors
}

fn check_credentials(config: &Config, env_path: &Path) -> Check {
    let in_env = config.bridge.api_key.is_some() && config.bridge.deployment_id.is_some();
    if in_env {
        return Check::new("credentials", CheckStatus::Ok, "found in environment");
    }

    if !env_path.exists() {
        return Check::new(
            "credentials",
            CheckStatus::Error,
            format!("{} not found; run `screenflow init`", env_path.display()),
        );
    }

    let iter = match dotenvy::from_path_iter(env_path) {
        Ok(iter) => iter,
        Err(e) => {
            return Check::new(
                "credentials",
                CheckStatus::Error,
                format!("{} is unreadable: {}", env_path.display(), e),
            )
        }
    };

    let filled: Vec<String> = iter
        .filter_map(|item| item.ok())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

    let missing: Vec<&str> = CREDENTIAL_KEYS
        .iter()
        .copied()
        .filter(|key| !filled.iter().any(|f| f == key))
        .collect();

    if missing.is_empty() {
        Check::new(
            "credentials",
            CheckStatus::Ok,
            format!("{} has credentials", env_path.display()),
        )
    } else {
        Check::new(
            "credentials",
            CheckStatus::Warning,
            format!("empty in {}: {}", env_path.display(), missing.join(", ")),
        )
    }
}

fn check_config_file() -> Check {
    let path = Config::config_file();
    if path.exists() {
        match Config::load_from(&path) {
            Ok(_) => Check::new("config", CheckStatus::Ok, path.display().to_string()),
            Err(e) => Check::new("config", CheckStatus::Error, e.to_string()),
        }
    } else {
        Check::new(
            "config",
            CheckStatus::Warning,
            format!("{} not found, using defaults", path.display()),
        )
    }
}

async fn check_bridge(config: &Config) -> Check {
    let bridge = BridgeAgent::from_config(config);
    if bridge.is_available().await {
        Check::new(
            "bridge",
            CheckStatus::Ok,
            format!("{} is installed", config.bridge.command),
        )
    } else {
        Check::new(
            "bridge",
            CheckStatus::Warning,
            format!(
                "{} did not answer --version; only --simulate runs will work",
                config.bridge.command
            ),
        )
    }
}

fn check_artifacts(dir: &Path) -> Check {
    if !dir.is_dir() {
        return Check::new(
            "artifacts",
            CheckStatus::Warning,
            format!("{} does not exist. Run `screenflow init`", dir.display()),
        );
    }

    let probe = dir.join(".screenflow-write-test");
    let writable = fs::write(&probe, b"").and_then(|_| fs::remove_file(&probe));

    match writable {
        Ok(()) => Check::new("artifacts", CheckStatus::Ok, dir.display().to_string()),
        Err(e) => Check::new(
            "artifacts",
            CheckStatus::Error,
            format!("{} is not writable: {}", dir.display(), e),
        ),
    }
}
