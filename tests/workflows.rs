//! Workflow integration tests
//!
//! Runs every bundled workflow end to end against the scripted agent and a
//! temporary artifact directory.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use screenflow::agent::AgentCall;
use screenflow::workflow::ArtifactDir;
use screenflow::{ComputerAgent, ScreenflowError, ScriptedAgent, Session, WorkflowRegistry};

/// Helper to run a workflow by name with a scripted agent
async fn invoke(name: &str, agent: &Arc<ScriptedAgent>, dir: &Path, payload: Value) -> Value {
    let session = Session::new(agent.clone(), ArtifactDir::new(dir));
    WorkflowRegistry::new()
        .run(name, &session, payload)
        .await
        .expect("workflow is registered")
}

fn login_payload() -> Value {
    json!({
        "WEB_URL": "https://portal.example.com/login",
        "USERNAME": "alice@example.com",
        "PASSWORD": "s3cret!"
    })
}

fn documents_payload() -> Value {
    json!({
        "PATIENT_NAME": "Bella Smith",
        "LOGIN_EMAIL": "vet@clinic.example",
        "LOGIN_PASSWORD": "pw"
    })
}

fn appointments_payload() -> Value {
    json!({
        "appointment_day": "January 15, 2026",
        "practice_email": "front@clinic.example",
        "practice_password": "pw"
    })
}

fn write_pdfs(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"%PDF-1.4").unwrap();
    }
}

/// Missing credentials never reach the agent
#[tokio::test]
async fn test_missing_inputs_short_circuit() {
    let cases = [
        ("website-login", json!({"WEB_URL": "https://a.example", "USERNAME": "u"})),
        ("website-login-custom", json!({"WEBSITE_URL": "https://a.example", "PASSWORD": "p"})),
        ("download-documents", json!({"PATIENT_NAME": "Bella Smith"})),
        ("get-appointments", json!({"practice_email": "x@y.z", "practice_password": "p"})),
    ];

    for (name, payload) in cases {
        let dir = tempfile::tempdir().unwrap();
        let agent = Arc::new(ScriptedAgent::new());
        let output = invoke(name, &agent, dir.path(), payload).await;

        assert_eq!(output["success"], false, "{}", name);
        let error = output["error"].as_str().unwrap_or_default();
        assert!(
            ["USERNAME", "PASSWORD", "LOGIN_EMAIL", "appointment_day"]
                .iter()
                .any(|field| error.contains(field)),
            "{}: {}",
            name,
            error
        );
        assert!(agent.calls().is_empty(), "{} touched the agent", name);
    }
}

#[tokio::test]
async fn test_invalid_input_leaves_artifacts_alone() {
    let dir = tempfile::tempdir().unwrap();
    write_pdfs(dir.path(), &["keep.pdf"]);

    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke("download-documents", &agent, dir.path(), json!({})).await;

    assert_eq!(output["success"], false);
    assert!(dir.path().join("keep.pdf").exists());
}

#[tokio::test]
async fn test_website_login_happy_path() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke("website-login", &agent, dir.path(), login_payload()).await;

    assert_eq!(
        output,
        json!({
            "success": true,
            "message": "Successfully logged into https://portal.example.com/login"
        })
    );

    let typed = agent.typed();
    assert!(typed.contains(&("https://portal.example.com/login".to_string(), None)));
    assert!(typed.contains(&("s3cret!".to_string(), Some(Duration::from_millis(10)))));
    assert!(agent.calls().contains(&AgentCall::Press {
        key: "Return".to_string()
    }));
}

#[tokio::test]
async fn test_browser_failure_stops_everything() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new().with_validations([false]));
    let output = invoke("website-login", &agent, dir.path(), login_payload()).await;

    assert_eq!(output["success"], false);
    assert_eq!(output["error"], "Failed to open browser");
    assert!(agent.typed().is_empty());
    assert_eq!(agent.questions().len(), 1);

    let agent = Arc::new(ScriptedAgent::new().with_validations([false]));
    let output = invoke("get-appointments", &agent, dir.path(), appointments_payload()).await;

    assert_eq!(output["error"], "Failed to open browser");
    assert_eq!(agent.extraction_count(), 0);
    assert!(!dir.path().join("appointments.json").exists());
}

#[tokio::test]
async fn test_login_verification_failure() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new().with_validations([true, true, false]));
    let output = invoke("website-login", &agent, dir.path(), login_payload()).await;

    assert_eq!(output["success"], false);
    assert_eq!(
        output["error"],
        "Login verification failed - user does not appear to be logged in"
    );
    assert!(output.get("message").is_none());
}

#[tokio::test]
async fn test_custom_login_recovers_from_popups() {
    let dir = tempfile::tempdir().unwrap();
    // firefox open, login form hidden, visible after dismissing banners
    let agent = Arc::new(ScriptedAgent::new().with_validations([true, false, true]));
    let payload = json!({
        "WEBSITE_URL": "https://crm.example.com",
        "USERNAME": "bob",
        "PASSWORD": "hunter2"
    });
    let output = invoke("website-login-custom", &agent, dir.path(), payload).await;

    assert_eq!(output["success"], true);
    assert_eq!(output["url"], "https://crm.example.com");
    assert_eq!(output["username"], "bob");
    assert!(output.get("error").is_none());
    assert!(agent
        .instructions()
        .iter()
        .any(|i| i.starts_with("Close any cookie banners")));
}

#[tokio::test]
async fn test_custom_login_gives_up_after_one_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new().with_validations([true, false, false]));
    let payload = json!({
        "WEBSITE_URL": "https://crm.example.com",
        "USERNAME": "bob",
        "PASSWORD": "hunter2"
    });
    let output = invoke("website-login-custom", &agent, dir.path(), payload).await;

    assert_eq!(output["error"], "Failed to load login page");
    assert!(agent.typed().iter().all(|(text, _)| text != "bob"));
}

#[tokio::test]
async fn test_custom_login_recovers_on_dashboard_check() {
    let dir = tempfile::tempdir().unwrap();
    // firefox open, form visible, dashboard missing, visible after inspection, still logged in
    let agent = Arc::new(ScriptedAgent::new().with_validations([true, true, false, true, true]));
    let payload = json!({
        "WEBSITE_URL": "https://crm.example.com",
        "USERNAME": "bob",
        "PASSWORD": "hunter2"
    });
    let output = invoke("website-login-custom", &agent, dir.path(), payload).await;

    assert_eq!(output["success"], true);
    assert_eq!(output["message"], "Successfully logged into https://crm.example.com");

    let instructions = agent.instructions();
    let inspections = instructions
        .iter()
        .filter(|i| i.starts_with("Check if there are any error messages"))
        .count();
    assert_eq!(inspections, 1);
    assert!(!instructions
        .iter()
        .any(|i| i.starts_with("Close any cookie banners")));
    assert_eq!(agent.questions().len(), 5);
}

#[tokio::test]
async fn test_custom_login_session_expired() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new().with_validations([true, true, true, false]));
    let payload = json!({
        "WEBSITE_URL": "https://crm.example.com",
        "USERNAME": "bob",
        "PASSWORD": "hunter2"
    });
    let output = invoke("website-login-custom", &agent, dir.path(), payload).await;

    assert_eq!(
        output["error"],
        "Login verification failed - user session may have expired"
    );
}

#[tokio::test]
async fn test_ezyvet_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke("ezyvet-login", &agent, dir.path(), json!({})).await;

    assert_eq!(
        output,
        json!({"success": true, "message": "Successfully logged into ezyVet"})
    );
    assert!(agent
        .instructions()
        .contains(&"Navigate to https://mybalto.usw2.trial.ezyvet.com/".to_string()));

    let agent = Arc::new(
        ScriptedAgent::new().with_validations([true, true, false]),
    );
    let output = invoke("ezyvet-login", &agent, dir.path(), json!({})).await;
    assert_eq!(output["error"], "Login failed - could not verify dashboard");
}

#[tokio::test]
async fn test_integration_check_navigation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new().with_validations([true, false]));
    let output = invoke(
        "integration-check",
        &agent,
        dir.path(),
        json!({"WEBSITE_URL": "https://status.example.org"}),
    )
    .await;

    assert_eq!(output["success"], false);
    assert_eq!(output["error"], "Failed to load website");
    assert_eq!(output["message"], "Integration check failed at navigation");
    assert_eq!(
        agent.questions()[1],
        "Is https://status.example.org loaded?"
    );
}

#[tokio::test]
async fn test_integration_check_echoes_requested_url() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke(
        "integration-check",
        &agent,
        dir.path(),
        json!({"WEBSITE_URL": "status.example.org"}),
    )
    .await;

    assert_eq!(output["success"], true);
    assert_eq!(output["url_visited"], "status.example.org");
    assert!(agent
        .instructions()
        .contains(&"Navigate to https://status.example.org".to_string()));
}

#[tokio::test]
async fn test_sdk_primitives_extracts_title() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(
        ScriptedAgent::new().with_extraction(Some(json!({"title": "Show HN: A tiny database"}))),
    );
    let output = invoke("sdk-primitives", &agent, dir.path(), json!({"post_index": 2})).await;

    assert_eq!(
        output,
        json!({"success": true, "title": "Show HN: A tiny database"})
    );

    match &agent.calls()[2] {
        AgentCall::Extract { instruction, schema } => {
            assert_eq!(instruction, "What is the title of post 3?");
            assert_eq!(schema["required"], json!(["title"]));
        }
        other => panic!("expected extraction, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sdk_primitives_largest_post_index() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke(
        "sdk-primitives",
        &agent,
        dir.path(),
        json!({"post_index": u32::MAX}),
    )
    .await;

    assert_eq!(output["success"], false);
    assert_eq!(output["error"], "Failed to extract the title of post 4294967296");
    match &agent.calls()[2] {
        AgentCall::Extract { instruction, .. } => {
            assert_eq!(instruction, "What is the title of post 4294967296?");
        }
        other => panic!("expected extraction, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sdk_primitives_without_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke("sdk-primitives", &agent, dir.path(), json!({})).await;

    assert_eq!(output["success"], false);
    assert_eq!(output["error"], "Failed to extract the title of post 1");
}

#[tokio::test]
async fn test_appointments_written_to_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let extracted = json!({
        "date": "Jan 15, 2026",
        "appointments": [
            {"start_time": "9:00 AM", "end_time": "9:30 AM", "description": "Checkup"}
        ]
    });
    let agent = Arc::new(ScriptedAgent::new().with_extraction(Some(extracted.clone())));
    let output = invoke("get-appointments", &agent, dir.path(), appointments_payload()).await;

    assert_eq!(output["success"], true);
    assert_eq!(output["appointments_count"], 1);
    assert_eq!(output["date"], "Jan 15, 2026");
    assert_eq!(output["appointments"], extracted["appointments"]);
    assert_eq!(output["message"], "Successfully extracted 1 appointment(s)");
    assert!(output.get("error").is_none());

    let written = std::fs::read_to_string(dir.path().join("appointments.json")).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&written).unwrap(), extracted);
}

#[tokio::test]
async fn test_appointments_extraction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new().with_extraction(None));
    let output = invoke("get-appointments", &agent, dir.path(), appointments_payload()).await;

    assert_eq!(output["error"], "Failed to extract appointments data");
    assert_eq!(agent.extraction_count(), 1);
    assert!(!dir.path().join("appointments.json").exists());
}

#[tokio::test]
async fn test_appointments_date_falls_back_to_requested_day() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(
        ScriptedAgent::new().with_extraction(Some(json!({"appointments": []}))),
    );
    let output = invoke("get-appointments", &agent, dir.path(), appointments_payload()).await;

    assert_eq!(output["success"], true);
    assert_eq!(output["date"], "January 15, 2026");
    assert_eq!(output["appointments_count"], 0);
}

#[tokio::test]
async fn test_documents_counted_after_download() {
    let dir = tempfile::tempdir().unwrap();
    write_pdfs(dir.path(), &["stale.pdf"]);

    let target = dir.path().to_path_buf();
    let agent = Arc::new(ScriptedAgent::new().on_act("download button", move |_| {
        write_pdfs(&target, &["lab-results.pdf", "xray.pdf", "invoice.pdf"]);
    }));
    let output = invoke("download-documents", &agent, dir.path(), documents_payload()).await;

    assert_eq!(
        output,
        json!({
            "success": true,
            "documents_downloaded": 3,
            "message": "Successfully downloaded 3 document(s)"
        })
    );
    assert!(!dir.path().join("stale.pdf").exists());
}

#[tokio::test]
async fn test_documents_none_downloaded() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(ScriptedAgent::new());
    let output = invoke("download-documents", &agent, dir.path(), documents_payload()).await;

    assert_eq!(output["success"], false);
    assert!(output["error"]
        .as_str()
        .unwrap()
        .starts_with("No PDF documents were downloaded"));
}

#[tokio::test]
async fn test_ambiguous_patient_search_retried_once() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().to_path_buf();
    // browser, page, login, patients page, first search ambiguous, retry unique
    let agent = Arc::new(
        ScriptedAgent::new()
            .with_validations([true, true, true, true, false, true])
            .on_act("download button", move |_| write_pdfs(&target, &["a.pdf"])),
    );
    let output = invoke("download-documents", &agent, dir.path(), documents_payload()).await;

    assert_eq!(output["success"], true);
    assert_eq!(output["documents_downloaded"], 1);
    let retries = agent
        .instructions()
        .iter()
        .filter(|i| i.as_str() == "Clear the search field and try searching again")
        .count();
    assert_eq!(retries, 1);
}

#[tokio::test]
async fn test_ambiguous_patient_search_fails_after_retry() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(
        ScriptedAgent::new().with_validations([true, true, true, true, false, false]),
    );
    let output = invoke("download-documents", &agent, dir.path(), documents_payload()).await;

    assert_eq!(
        output["error"],
        "Could not find unique patient match for 'Bella Smith'"
    );
    assert!(!agent
        .instructions()
        .iter()
        .any(|i| i.contains("open their profile")));
}

/// Agent whose transport is broken
struct BrokenAgent;

#[async_trait]
impl ComputerAgent for BrokenAgent {
    async fn act(&self, _instruction: &str, _max_iterations: Option<u32>) -> screenflow::Result<()> {
        Err(ScreenflowError::agent("bridge crashed"))
    }

    async fn validate(&self, _question: &str, _timeout: Duration) -> screenflow::Result<bool> {
        Err(ScreenflowError::agent("bridge crashed"))
    }

    async fn extract(&self, _instruction: &str, _schema: &Value) -> screenflow::Result<Option<Value>> {
        Err(ScreenflowError::agent("bridge crashed"))
    }

    async fn type_text(&self, _text: &str, _interval: Option<Duration>) -> screenflow::Result<()> {
        Err(ScreenflowError::agent("bridge crashed"))
    }

    async fn press(&self, _key: &str) -> screenflow::Result<()> {
        Err(ScreenflowError::agent("bridge crashed"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn test_agent_errors_become_failed_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::new(Arc::new(BrokenAgent), ArtifactDir::new(dir.path()));
    let registry = WorkflowRegistry::new();

    let payloads = [
        ("website-login", login_payload()),
        ("download-documents", documents_payload()),
        ("get-appointments", appointments_payload()),
        ("ezyvet-login", json!({})),
    ];

    for (name, payload) in payloads {
        let output = registry.run(name, &session, payload).await.unwrap();
        assert_eq!(output["success"], false, "{}", name);
        assert!(output["error"]
            .as_str()
            .unwrap()
            .contains("bridge crashed"));
    }
}
