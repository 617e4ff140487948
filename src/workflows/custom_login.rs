//! Login with popup recovery and a second session check
//!
//! Same shape as `website-login`, but each of the two slow checkpoints gets
//! one recovery action, and the session is re-verified before reporting.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Outcome, Result, Secret};
use crate::workflow::{normalize_url, require, Recovery, Session, Workflow, WorkflowInput};

const LOGIN_FORM_VISIBLE: &str = "Is the login page visible with username and password fields?";
const LOGGED_IN: &str = "Is the user successfully logged in? Can you see a dashboard, profile icon, user menu, or other indication of successful authentication?";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CustomLoginInput {
    /// Login page URL
    #[serde(rename = "WEBSITE_URL")]
    pub website_url: Option<String>,
    /// Username or email
    #[serde(rename = "USERNAME")]
    pub username: Option<String>,
    #[serde(rename = "PASSWORD")]
    pub password: Option<Secret>,
}

impl WorkflowInput for CustomLoginInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        let url = self.website_url.as_deref().unwrap_or_default();
        require("WEBSITE_URL", url)?;
        require("USERNAME", self.username.as_deref().unwrap_or_default())?;
        if self.password.as_ref().map_or(true, Secret::is_empty) {
            return Err("PASSWORD is required".to_string());
        }
        self.website_url = Some(normalize_url("WEBSITE_URL", url)?);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedIn {
    pub url: String,
    pub username: String,
}

/// Generic login with bounded recovery on slow checkpoints
pub struct CustomWebsiteLogin;

#[async_trait]
impl Workflow for CustomWebsiteLogin {
    type Input = CustomLoginInput;
    type Output = LoggedIn;

    fn name(&self) -> &'static str {
        "website-login-custom"
    }

    fn description(&self) -> &'static str {
        "Log into any website, dismissing popups and re-checking the session"
    }

    async fn run(&self, session: &Session, input: CustomLoginInput) -> Result<Outcome<LoggedIn>> {
        // prepare() guarantees all three are present
        let url = input.website_url.unwrap_or_default();
        let username = input.username.unwrap_or_default();
        let password = input.password.unwrap_or_default();

        tracing::info!(url = %url, username = %username, "phase 1: launching Firefox");
        session
            .act_within("Find and click the Firefox icon to launch the browser.", 10)
            .await?;
        if !session
            .check("Is Firefox open?", Duration::from_secs(10))
            .await?
        {
            return Ok(Outcome::failure("Failed to launch Firefox"));
        }

        session
            .act_within(
                "Close any welcome screens, popups, banners, or dialogs that may appear. Press Escape or click X buttons as needed.",
                5,
            )
            .await?;

        tracing::info!(url = %url, "phase 2: navigating to login page");
        session
            .act_within(
                "Click the address bar at the top of the Firefox browser window to focus it.",
                5,
            )
            .await?;
        session.type_text(&url).await?;
        session.press("Return").await?;

        let form_visible = session
            .check_with_recovery(
                LOGIN_FORM_VISIBLE,
                Duration::from_secs(30),
                Recovery {
                    instruction: "Close any cookie banners, popups, or dialogs by clicking X, 'Accept', 'Decline', or pressing Escape.",
                    max_iterations: 5,
                    retry_timeout: Duration::from_secs(10),
                },
            )
            .await?;
        if !form_visible {
            return Ok(Outcome::failure("Failed to load login page"));
        }

        tracing::info!("phase 3: entering credentials");
        session
            .act_within(
                "Find the username or email input field and click it to focus.",
                8,
            )
            .await?;
        session.type_text(&username).await?;

        session
            .act_within("Find the password input field and click it to focus.", 8)
            .await?;
        session.type_secret(&password).await?;

        session
            .act_within(
                "Find the login, sign in, or submit button and click it.",
                8,
            )
            .await?;

        tracing::info!("phase 4: verifying login");
        let logged_in = session
            .check_with_recovery(
                LOGGED_IN,
                Duration::from_secs(30),
                Recovery {
                    instruction: "Check if there are any error messages or if login failed. Take a screenshot if you see an error.",
                    max_iterations: 3,
                    retry_timeout: Duration::from_secs(10),
                },
            )
            .await?;
        if !logged_in {
            return Ok(Outcome::failure(
                "Login failed - could not verify successful authentication",
            ));
        }

        if !session
            .check_default("Is the user still logged in with the dashboard or profile visible?")
            .await?
        {
            return Ok(Outcome::failure(
                "Login verification failed - user session may have expired",
            ));
        }

        Ok(
            Outcome::success(LoggedIn {
                url: url.clone(),
                username,
            })
            .with_message(format!("Successfully logged into {}", url)),
        )
    }
}
