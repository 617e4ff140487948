//! Scrape the booked appointments for one calendar day
//!
//! The extracted data is written verbatim to `appointments.json` in the
//! artifact directory and returned as typed records.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::core::{Outcome, Result, Secret};
use crate::workflow::{normalize_url, require, Session, Workflow, WorkflowInput};

/// File written into the artifact directory
pub const APPOINTMENTS_FILE: &str = "appointments.json";

/// Single booked appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Appointment {
    pub start_time: String,
    pub end_time: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AppointmentsInput {
    /// Day to retrieve appointments for (e.g., 'January 15, 2026')
    #[serde(default)]
    pub appointment_day: String,
    /// Practice login email address
    #[serde(default)]
    pub practice_email: String,
    /// Practice login password
    #[serde(default)]
    pub practice_password: Secret,
    /// Login page of the practice application
    #[serde(default = "default_login_url")]
    pub login_url: String,
}

fn default_login_url() -> String {
    "https://app.example.com/login".to_string()
}

impl WorkflowInput for AppointmentsInput {
    fn prepare(&mut self) -> std::result::Result<(), String> {
        require("appointment_day", &self.appointment_day)?;
        require("practice_email", &self.practice_email)?;
        if self.practice_password.is_empty() {
            return Err("practice_password is required".to_string());
        }
        self.login_url = normalize_url("login_url", &self.login_url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    pub date: String,
    pub appointments: Vec<Appointment>,
    pub appointments_count: usize,
}

/// Shape requested from the extractor
#[derive(Debug, Deserialize)]
struct ExtractedSchedule {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    appointments: Vec<Appointment>,
}

fn schedule_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "date": {"type": "string"},
            "appointments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "start_time": {"type": "string"},
                        "end_time": {"type": "string"},
                        "description": {"type": "string"}
                    },
                    "required": ["start_time", "end_time", "description"]
                }
            }
        },
        "required": ["date", "appointments"]
    })
}

/// Extract all appointments for a day from the practice calendar
pub struct GetAppointments;

#[async_trait]
impl Workflow for GetAppointments {
    type Input = AppointmentsInput;
    type Output = DaySchedule;

    fn name(&self) -> &'static str {
        "get-appointments"
    }

    fn description(&self) -> &'static str {
        "Log into the practice calendar and extract a day's appointments"
    }

    async fn run(&self, session: &Session, input: AppointmentsInput) -> Result<Outcome<DaySchedule>> {
        let day = input.appointment_day.trim();

        session.act("Open Firefox or Chromium browser").await?;
        if !session
            .check("Is the browser open?", Duration::from_secs(10))
            .await?
        {
            return Ok(Outcome::failure("Failed to open browser"));
        }

        session
            .enter_url("Click the address bar at the top of the browser", &input.login_url)
            .await?;
        if !session
            .check(
                "Is the login page visible with email and password fields?",
                Duration::from_secs(30),
            )
            .await?
        {
            return Ok(Outcome::failure("Failed to load login page"));
        }

        tracing::info!("logging in");
        session
            .act_within(
                &format!(
                    "Click the email field and type '{}'",
                    input.practice_email
                ),
                5,
            )
            .await?;
        session.act_within("Click the password field", 3).await?;
        session.type_secret(&input.practice_password).await?;
        session
            .act_within("Click the Login or Sign In button", 5)
            .await?;

        if !session
            .check(
                "Is the user logged in? Look for a dashboard or navigation menu.",
                Duration::from_secs(30),
            )
            .await?
        {
            return Ok(Outcome::failure("Failed to log in"));
        }

        tracing::info!(day, "opening calendar");
        session
            .act_within(
                "Find and click on 'Calendar', 'Appointments', or 'Schedule' in the navigation menu",
                10,
            )
            .await?;
        if !session
            .check("Is the calendar page visible?", Duration::from_secs(15))
            .await?
        {
            return Ok(Outcome::failure("Could not navigate to calendar"));
        }

        session
            .act_within(
                &format!(
                    "Navigate to the date {}. Use the date picker or navigation arrows.",
                    day
                ),
                10,
            )
            .await?;
        if !session
            .check(
                &format!("Is the calendar showing {}?", day),
                Duration::from_secs(15),
            )
            .await?
        {
            return Ok(Outcome::failure(format!(
                "Could not navigate to date {}",
                day
            )));
        }

        let instruction = format!(
            "Look at the calendar for {}. Extract ALL booked appointments visible. For each appointment, record the start_time, end_time, and description.",
            day
        );
        let raw = match session.extract(&instruction, &schedule_schema()).await? {
            Some(raw) => raw,
            None => return Ok(Outcome::failure("Failed to extract appointments data")),
        };

        let schedule: ExtractedSchedule = match serde_json::from_value(raw.clone()) {
            Ok(schedule) => schedule,
            Err(e) => {
                return Ok(Outcome::failure(format!(
                    "Extracted appointments data has an unexpected shape: {}",
                    e
                )))
            }
        };

        session
            .artifacts()
            .write_json(APPOINTMENTS_FILE, &raw)
            .await?;
        if !session.artifacts().exists(APPOINTMENTS_FILE).await {
            return Ok(Outcome::failure(format!(
                "Failed to save {}",
                APPOINTMENTS_FILE
            )));
        }

        let count = schedule.appointments.len();
        tracing::info!(count = count as u64, "appointments extracted");

        Ok(Outcome::success(DaySchedule {
            date: schedule.date.unwrap_or_else(|| day.to_string()),
            appointments: schedule.appointments,
            appointments_count: count,
        })
        .with_message(format!("Successfully extracted {} appointment(s)", count)))
    }
}
