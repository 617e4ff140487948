//! ezyVet trial login

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

use crate::core::{Empty, Outcome, Result, Secret};
use crate::workflow::{normalize_url, Session, Workflow, WorkflowInput};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EzyvetLoginInput {
    #[serde(rename = "WEBSITE_URL", default = "default_url")]
    pub website_url: String,
    #[serde(rename = "USERNAME", default = "default_username")]
    pub username: String,
    #[serde(rename = "PASSWORD", default = "default_password")]
    pub password: Secret,
}

fn default_url() -> String {
    "https://mybalto.usw2.trial.ezyvet.com/".to_string()
}

fn default_username() -> String {
    "sample_username".to_string()
}

fn default_password() -> Secret {
    Secret::new("sample_password")
}

impl WorkflowInput for EzyvetLoginInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        self.website_url = normalize_url("WEBSITE_URL", &self.website_url)?;
        Ok(())
    }
}

/// Log into the ezyVet trial system
pub struct EzyvetLogin;

#[async_trait]
impl Workflow for EzyvetLogin {
    type Input = EzyvetLoginInput;
    type Output = Empty;

    fn name(&self) -> &'static str {
        "ezyvet-login"
    }

    fn description(&self) -> &'static str {
        "Log into the ezyVet trial system"
    }

    async fn run(&self, session: &Session, input: EzyvetLoginInput) -> Result<Outcome> {
        session.act("Open Firefox").await?;
        if !session
            .check("Is Firefox open?", Duration::from_secs(10))
            .await?
        {
            return Ok(Outcome::failure("Failed to open Firefox"));
        }

        session
            .act(&format!("Navigate to {}", input.website_url))
            .await?;
        if !session
            .check("Is the login page loaded?", Duration::from_secs(20))
            .await?
        {
            return Ok(Outcome::failure("Failed to load login page"));
        }

        session.act("Click the username field").await?;
        session.type_text(&input.username).await?;

        session.act("Click the password field").await?;
        session.type_secret(&input.password).await?;

        session.act("Click the login or sign in button").await?;

        if session
            .check(
                "Is the user logged in? Look for a dashboard or profile menu.",
                Duration::from_secs(30),
            )
            .await?
        {
            Ok(Outcome::done("Successfully logged into ezyVet"))
        } else {
            Ok(Outcome::failure("Login failed - could not verify dashboard"))
        }
    }
}
