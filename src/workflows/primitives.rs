//! SDK primitives demo: open a page, confirm it loaded, read one post title

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::{Outcome, Result};
use crate::workflow::{normalize_url, require, Session, Workflow, WorkflowInput};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PrimitivesInput {
    /// Page to open
    #[serde(default = "default_website_url")]
    pub website_url: String,
    /// Zero-based index of the post whose title is read
    #[serde(default, alias = "TITLE_NUMBER")]
    pub post_index: u32,
}

fn default_website_url() -> String {
    "https://news.ycombinator.com".to_string()
}

impl WorkflowInput for PrimitivesInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        require("website_url", &self.website_url)?;
        self.website_url = normalize_url("website_url", &self.website_url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostTitle {
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct Extracted {
    title: String,
}

/// Demonstrates `act`, `validate` and `extract` on a public page
pub struct SdkPrimitives;

#[async_trait]
impl Workflow for SdkPrimitives {
    type Input = PrimitivesInput;
    type Output = PostTitle;

    fn name(&self) -> &'static str {
        "sdk-primitives"
    }

    fn description(&self) -> &'static str {
        "Open a page and extract the title of the Nth post"
    }

    async fn run(&self, session: &Session, input: PrimitivesInput) -> Result<Outcome<PostTitle>> {
        session
            .act(&format!("Open Firefox and navigate to {}", input.website_url))
            .await?;

        if !session
            .check_default("Is the website loaded in the browser?")
            .await?
        {
            return Ok(Outcome::failure("Failed to load website"));
        }

        let schema = json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"}
            },
            "required": ["title"]
        });

        let post_number = u64::from(input.post_index) + 1;
        let question = format!("What is the title of post {}?", post_number);
        let extracted = session
            .extract(&question, &schema)
            .await?
            .and_then(|value| serde_json::from_value::<Extracted>(value).ok());

        match extracted {
            Some(Extracted { title }) => Ok(Outcome::success(PostTitle { title })),
            None => Ok(Outcome::failure(format!(
                "Failed to extract the title of post {}",
                post_number
            ))),
        }
    }
}
