//! Smoke test for a freshly configured agent: launch the browser, load a page

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Outcome, Result};
use crate::workflow::{normalize_url, Session, Workflow, WorkflowInput};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IntegrationCheckInput {
    /// Page used for the navigation check
    #[serde(rename = "WEBSITE_URL", default = "default_url")]
    pub website_url: String,
    /// `website_url` with a scheme, used for navigation
    #[serde(skip)]
    pub target_url: String,
}

fn default_url() -> String {
    "https://example.com".to_string()
}

impl WorkflowInput for IntegrationCheckInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        if self.website_url.trim().is_empty() {
            self.website_url = default_url();
        }
        self.target_url = normalize_url("WEBSITE_URL", &self.website_url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Visited {
    pub url_visited: String,
}

/// Verifies the agent can open a browser and navigate
pub struct IntegrationCheck;

#[async_trait]
impl Workflow for IntegrationCheck {
    type Input = IntegrationCheckInput;
    type Output = Visited;

    fn name(&self) -> &'static str {
        "integration-check"
    }

    fn description(&self) -> &'static str {
        "Check the agent integration by opening Firefox and loading a page"
    }

    async fn run(&self, session: &Session, input: IntegrationCheckInput) -> Result<Outcome<Visited>> {
        let url = input.target_url;

        session.act("Open Firefox").await?;
        if !session
            .check("Is Firefox open?", Duration::from_secs(10))
            .await?
        {
            return Ok(Outcome::failure("Failed to open Firefox")
                .with_message("Integration check failed at browser launch"));
        }

        session.act(&format!("Navigate to {}", url)).await?;
        if !session
            .check(&format!("Is {} loaded?", url), Duration::from_secs(20))
            .await?
        {
            return Ok(Outcome::failure("Failed to load website")
                .with_message("Integration check failed at navigation"));
        }

        Ok(Outcome::success(Visited {
            url_visited: input.website_url,
        })
            .with_message("Integration check completed successfully"))
    }
}
