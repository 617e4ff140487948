//! Generic login: browser, address bar, credentials, dashboard check

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

use crate::core::{Empty, Outcome, Result, Secret};
use crate::workflow::{normalize_url, Session, Workflow, WorkflowInput};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WebsiteLoginInput {
    /// Login page, e.g. https://example.com/login
    #[serde(rename = "WEB_URL", default)]
    pub web_url: String,
    /// Username or email
    #[serde(rename = "USERNAME", default)]
    pub username: String,
    #[serde(rename = "PASSWORD", default)]
    pub password: Secret,
}

impl WorkflowInput for WebsiteLoginInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        if self.web_url.trim().is_empty() || self.username.trim().is_empty() || self.password.is_empty() {
            return Err("Missing required parameters: WEB_URL, USERNAME, PASSWORD".to_string());
        }
        self.web_url = normalize_url("WEB_URL", &self.web_url)?;
        Ok(())
    }
}

/// Log into a website with username and password
pub struct WebsiteLogin;

#[async_trait]
impl Workflow for WebsiteLogin {
    type Input = WebsiteLoginInput;
    type Output = Empty;

    fn name(&self) -> &'static str {
        "website-login"
    }

    fn description(&self) -> &'static str {
        "Log into a website with a username and password"
    }

    async fn run(&self, session: &Session, input: WebsiteLoginInput) -> Result<Outcome> {
        tracing::info!("launching browser");
        session.act("Open Firefox or Chromium browser").await?;
        if !session
            .check("Is the browser open?", Duration::from_secs(10))
            .await?
        {
            return Ok(Outcome::failure("Failed to open browser"));
        }

        session
            .act_within(
                "Close any welcome messages, popups, or dialogs if they appear",
                5,
            )
            .await?;

        session
            .enter_url("Click the address bar at the top of the browser", &input.web_url)
            .await?;

        if !session
            .check("Is the webpage loading or loaded?", Duration::from_secs(30))
            .await?
        {
            return Ok(Outcome::failure(format!("Failed to load {}", input.web_url)));
        }

        tracing::info!("entering credentials");
        session
            .act_within(
                &format!(
                    "Click the username or email field and type '{}'",
                    input.username
                ),
                5,
            )
            .await?;

        session.act_within("Click the password field", 3).await?;
        session.type_secret(&input.password).await?;

        session
            .act_within("Click the Login or Sign In button", 5)
            .await?;

        if !session
            .check(
                "Is the user logged in? Look for a dashboard, profile menu, navigation sidebar, or welcome message.",
                Duration::from_secs(30),
            )
            .await?
        {
            return Ok(Outcome::failure(
                "Login verification failed - user does not appear to be logged in",
            ));
        }

        Ok(Outcome::done(format!("Successfully logged into {}", input.web_url)))
    }
}
