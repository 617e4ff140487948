//! Download every document attached to a patient profile
//!
//! Success is judged by the artifact directory, not by the agent: stale PDFs
//! are removed up front and the run fails if none arrive.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Outcome, Result, Secret};
use crate::workflow::{normalize_url, Recovery, Session, Workflow, WorkflowInput};

const DOWNLOAD_ALL: &str = "For each document/PDF visible:
1. Click on the document or download button
2. If a download dialog appears, click Save or Download
3. Wait for download to complete
4. Move to the next document

Repeat until all documents are downloaded.";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DownloadDocumentsInput {
    /// Patient to search for
    #[serde(rename = "PATIENT_NAME", default)]
    pub patient_name: String,
    #[serde(rename = "LOGIN_EMAIL", default)]
    pub login_email: String,
    #[serde(rename = "LOGIN_PASSWORD", default)]
    pub login_password: Secret,
    /// Practice management application
    #[serde(rename = "APP_URL", default = "default_app_url")]
    pub app_url: String,
}

fn default_app_url() -> String {
    "https://app.example.com".to_string()
}

impl WorkflowInput for DownloadDocumentsInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        if self.patient_name.trim().is_empty()
            || self.login_email.trim().is_empty()
            || self.login_password.is_empty()
        {
            return Err(
                "Missing required parameters: PATIENT_NAME, LOGIN_EMAIL, LOGIN_PASSWORD"
                    .to_string(),
            );
        }
        self.app_url = normalize_url("APP_URL", &self.app_url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Downloaded {
    pub documents_downloaded: usize,
}

/// Download all documents for one patient into the artifact directory
pub struct DownloadDocuments;

#[async_trait]
impl Workflow for DownloadDocuments {
    type Input = DownloadDocumentsInput;
    type Output = Downloaded;

    fn name(&self) -> &'static str {
        "download-documents"
    }

    fn description(&self) -> &'static str {
        "Find a patient and download all of their documents as PDFs"
    }

    async fn run(
        &self,
        session: &Session,
        input: DownloadDocumentsInput,
    ) -> Result<Outcome<Downloaded>> {
        let patient = input.patient_name.trim();

        session.artifacts().clear_pdfs().await?;

        tracing::info!("launching browser");
        session.act("Open Firefox browser").await?;
        if !session
            .check("Is Firefox open?", Duration::from_secs(10))
            .await?
        {
            return Ok(Outcome::failure("Failed to open Firefox"));
        }

        session
            .enter_url("Click the address bar at the top of the browser", &input.app_url)
            .await?;
        if !session
            .check("Is the webpage loading or loaded?", Duration::from_secs(30))
            .await?
        {
            return Ok(Outcome::failure("Failed to load application URL"));
        }

        tracing::info!("logging in");
        session
            .act_within(
                &format!(
                    "If a login page is visible, enter email '{}' in the email field, enter the password in the password field, then click the login button. If already logged in, do nothing.",
                    input.login_email
                ),
                15,
            )
            .await?;
        if !session
            .check(
                "Is the user logged in? Look for a main navigation menu or dashboard.",
                Duration::from_secs(30),
            )
            .await?
        {
            return Ok(Outcome::failure("Failed to log in"));
        }

        tracing::info!(patient, "searching for patient");
        session
            .act_within(
                "Find and click on 'Patients' or 'Clients' in the navigation menu",
                10,
            )
            .await?;
        if !session
            .check(
                "Is the patients page visible with a search field?",
                Duration::from_secs(15),
            )
            .await?
        {
            return Ok(Outcome::failure("Could not navigate to patients section"));
        }

        session
            .act_within(
                &format!(
                    "Find the search field and type '{}'. Wait for search results to appear.",
                    patient
                ),
                10,
            )
            .await?;

        let unique_match = session
            .check_with_recovery(
                &format!("Is there exactly one patient result matching '{}'?", patient),
                Duration::from_secs(10),
                Recovery {
                    instruction: "Clear the search field and try searching again",
                    max_iterations: 3,
                    retry_timeout: Duration::from_secs(10),
                },
            )
            .await?;
        if !unique_match {
            return Ok(Outcome::failure(format!(
                "Could not find unique patient match for '{}'",
                patient
            )));
        }

        session
            .act_within(
                &format!("Click on the patient '{}' to open their profile", patient),
                5,
            )
            .await?;
        if !session
            .check("Is the patient profile page open?", Duration::from_secs(15))
            .await?
        {
            return Ok(Outcome::failure("Failed to open patient profile"));
        }

        tracing::info!("downloading documents");
        session
            .act_within(
                "Look for a 'Documents', 'Files', or 'Attachments' tab or section. Click on it.",
                10,
            )
            .await?;
        if !session
            .check("Is the documents section visible?", Duration::from_secs(15))
            .await?
        {
            return Ok(Outcome::failure("Could not find documents section"));
        }

        session.act_within(DOWNLOAD_ALL, 30).await?;
        if !session
            .check(
                "Have all visible documents been downloaded?",
                Duration::from_secs(60),
            )
            .await?
        {
            return Ok(Outcome::failure("Not all documents were downloaded"));
        }

        let count = session.artifacts().count_pdfs().await?;
        if count == 0 {
            return Ok(Outcome::failure(format!(
                "No PDF documents were downloaded to {}",
                session.artifacts().root().display()
            )));
        }

        Ok(Outcome::success(Downloaded {
            documents_downloaded: count,
        })
        .with_message(format!("Successfully downloaded {} document(s)", count)))
    }
}
