//! screenflow - browser automation workflows
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use screenflow::cli::{commands, setup, RunOptions};
use screenflow::{Config, WorkflowRegistry};

/// screenflow - natural-language browser automation workflows
#[derive(Parser, Debug)]
#[command(name = "screenflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Config file (default: ~/.config/screenflow/config.toml)
    #[arg(long, global = true, env = "SCREENFLOW_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available workflows
    List,

    /// Print the input JSON schema of a workflow
    Schema {
        /// Workflow name
        workflow: String,
    },

    /// Run a workflow and print its result as JSON
    Run {
        /// Workflow name
        workflow: String,

        /// Input payload as a JSON object
        #[arg(long, short = 'p')]
        payload: Option<String>,

        /// Read the input payload from a JSON file
        #[arg(long)]
        payload_file: Option<PathBuf>,

        /// Set a string input, e.g. --set USERNAME=alice
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Set a JSON input, e.g. --set-json post_index=2
        #[arg(long = "set-json", value_name = "KEY=JSON")]
        set_json: Vec<String>,

        /// Override the artifact directory
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,

        /// Use the scripted agent instead of the bridge
        #[arg(long)]
        simulate: bool,

        /// Script for --simulate (validations, extractions)
        #[arg(long, requires = "simulate")]
        script: Option<PathBuf>,
    },

    /// Create .env, config file and artifact directory
    Init,

    /// Check credentials, config, bridge and artifact directory
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let config = match cli.config {
        Some(ref path) => {
            let _ = dotenvy::dotenv();
            Config::load_from(path)?
        }
        None => Config::load(),
    };

    let registry = WorkflowRegistry::new();
    let env_path = PathBuf::from(".env");

    match cli.command {
        Commands::List => {
            print!("{}", commands::list(&registry));
        }

        Commands::Schema { workflow } => {
            println!("{}", commands::schema(&registry, &workflow)?);
        }

        Commands::Run {
            workflow,
            payload,
            payload_file,
            set,
            set_json,
            artifacts_dir,
            simulate,
            script,
        } => {
            let opts = RunOptions {
                workflow,
                payload,
                payload_file,
                set,
                set_json,
                artifacts_dir,
                simulate,
                script,
            };

            let output = commands::run(&config, &registry, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);

            if output["success"] != true {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Init => {
            setup::init(&config, &env_path)?;
        }

        Commands::Doctor => {
            if !setup::doctor(&config, &env_path).await {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
