//! The HTTP transport against a live server on a loopback port.

use std::sync::Arc;
use std::time::Duration;

use formconfig_admin::store::{apply, InMemoryConfigStore};
use formconfig_client::{
    Banner, FormApi, FormSession, HttpFormApi, PipelineState, SubmissionPipeline, SubmitOutcome,
};
use formconfig_core::{FormConfigError, Settings};
use formconfig_forms::seed::default_configuration;
use formconfig_forms::{ChangeEvent, FormValue, Submission};
use formconfig_server::{FormConfigApp, InMemorySubmissionSink};

// ── Helpers ─────────────────────────────────────────────────────────

struct Running {
    base_url: String,
    store: Arc<InMemoryConfigStore>,
    sink: InMemorySubmissionSink,
}

async fn spawn_server() -> Running {
    let store = Arc::new(InMemoryConfigStore::new(default_configuration()));
    let sink = InMemorySubmissionSink::new();
    let router = FormConfigApp::new(Settings::default())
        .store(store.clone())
        .sink(Arc::new(sink.clone()))
        .into_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum_serve(listener, router).await;
    });

    Running {
        base_url: format!("http://{addr}"),
        store,
        sink,
    }
}

async fn axum_serve(listener: tokio::net::TcpListener, router: axum::Router) {
    axum::serve(listener, router).await.unwrap();
}

fn api(base_url: &str) -> Arc<HttpFormApi> {
    Arc::new(HttpFormApi::new(base_url, Duration::from_secs(5)).unwrap())
}

// ═════════════════════════════════════════════════════════════════════
// 1. Fetching
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_fetch_public_configuration() {
    let server = spawn_server().await;
    let config = api(&server.base_url).fetch_config().await.unwrap();
    assert_eq!(config.form_types.len(), 2);
    assert_eq!(config.form_types[0].name, "residential");
}

#[tokio::test]
async fn test_unreachable_server_is_configuration_load() {
    // Port 9 (discard) on loopback is not served by anything in the test run.
    let api = HttpFormApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = FormSession::load(&api).await.unwrap_err();
    assert!(matches!(err, FormConfigError::ConfigurationLoad(_)));
}

// ═════════════════════════════════════════════════════════════════════
// 2. Submitting
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_pipeline_submits_to_server() {
    let server = spawn_server().await;
    let api = api(&server.base_url);
    let session = FormSession::load(api.as_ref()).await.unwrap();
    let mut pipeline = SubmissionPipeline::new(&session, api);

    pipeline.select_form_type("commercial").unwrap();
    pipeline.set_value("companyName", "Acme Corp");
    pipeline.set_value("contactName", "Wile E.");
    pipeline.set_value("email", "wile@acme.test");
    pipeline.set_value("phone", "5550001111");
    pipeline.set_value("employees", "40");
    pipeline.apply_change("services", ChangeEvent::ToggleOption("solar".into()));

    let outcome = pipeline.submit().await;
    let expected = session
        .form_type("commercial")
        .unwrap()
        .success_message
        .clone();
    assert_eq!(outcome, SubmitOutcome::Submitted(expected));
    assert_eq!(pipeline.state(), PipelineState::Success);

    let records = server.sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].form_type, "commercial");
    assert_eq!(
        records[0].form_data["services"],
        FormValue::Choices(vec!["solar".into()])
    );
    assert!(!records[0].form_data.contains_key("name"));
}

#[tokio::test]
async fn test_stale_session_gets_server_message() {
    let server = spawn_server().await;
    let api = api(&server.base_url);
    let session = FormSession::load(api.as_ref()).await.unwrap();
    let mut pipeline = SubmissionPipeline::new(&session, api);

    // An administrator edits the schema after the session loaded.
    apply(server.store.as_ref(), None, |c| {
        c.form_name = "Request a Quote".into();
        Ok(())
    })
    .await
    .unwrap();

    pipeline.set_value("name", "Ada Lovelace");
    pipeline.set_value("email", "ada@example.com");
    pipeline.set_value("phone", "5551234567");
    pipeline.set_value("propertyType", "condo");

    let outcome = pipeline.submit().await;
    let message = match outcome {
        SubmitOutcome::Failed(message) => message,
        other => panic!("expected a failed outcome, got {other:?}"),
    };
    assert!(message.contains("reload"));
    assert_eq!(pipeline.banner(), Some(&Banner::Error(message)));
    assert_eq!(pipeline.value("name"), Some(&FormValue::text("Ada Lovelace")));
    assert!(server.sink.is_empty().await);
}

#[tokio::test]
async fn test_server_field_errors_come_back_as_field_validation() {
    let server = spawn_server().await;
    let submission = Submission {
        form_type: "residential".into(),
        form_data: std::collections::HashMap::new(),
        schema_version: None,
    };
    let err = api(&server.base_url).submit(&submission).await.unwrap_err();
    let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"phone"));
}
