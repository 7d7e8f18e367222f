use std::time::Duration;

use lexsum_core::{StepStatus, TabKind};
use lexsum_engine::{ApiSettings, BackendApi, FailureKind, ReqwestBackend, UploadFile};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(ApiSettings::with_base_url(server.uri())).expect("backend")
}

#[tokio::test]
async fn upload_posts_multipart_file_field_and_returns_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize-ui"))
        .and(header_exists("content-type"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"contract.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "r1"})))
        .expect(1)
        .mount(&server)
        .await;

    let file = UploadFile::new("contract.pdf", b"%PDF-1.7".to_vec());
    let request_id = backend(&server).upload(&file).await.expect("upload ok");
    assert_eq!(request_id, "r1");
}

#[tokio::test]
async fn upload_without_request_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize-ui"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .mount(&server)
        .await;

    let file = UploadFile::new("contract.pdf", b"%PDF-1.7".to_vec());
    let err = backend(&server).upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingRequestId);
}

#[tokio::test]
async fn upload_http_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize-ui"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let file = UploadFile::new("huge.pdf", vec![0u8; 16]);
    let err = backend(&server).upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(413));
}

#[tokio::test]
async fn progress_accepts_wrapped_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "progress": 62.5,
            "progress_percentage": 10,
            "status": "processing",
            "message": "Assessing risk",
            "completed": false,
            "steps": [
                {"step_name": "Text Extraction", "status": "completed", "duration_ms": 1200.4},
                {"step_name": "Risk Assessment", "status": "in_progress", "progress_percentage": 40}
            ]
        })))
        .mount(&server)
        .await;

    let snapshot = backend(&server).progress("r1").await.expect("progress ok");
    assert_eq!(snapshot.percentage, 62.5);
    assert_eq!(snapshot.message, "Assessing risk");
    assert_eq!(snapshot.status.as_deref(), Some("processing"));
    assert!(!snapshot.completed);
    assert_eq!(snapshot.steps.len(), 2);
    assert_eq!(snapshot.steps[0].status, StepStatus::Completed);
    assert_eq!(snapshot.steps[0].timing.duration_ms, Some(1200));
    assert_eq!(snapshot.steps[1].status, StepStatus::Active);
    assert_eq!(snapshot.steps[1].percentage, Some(40.0));
}

#[tokio::test]
async fn progress_accepts_bare_step_array_and_derives_percentage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"step_name": "Text Extraction", "status": "completed"},
            {"step_name": "Classification", "status": "completed"},
            {"step_name": "Risk Assessment", "status": "processing"},
            {"step_name": "Quality Review", "status": "pending"}
        ])))
        .mount(&server)
        .await;

    let snapshot = backend(&server).progress("r1").await.expect("progress ok");
    assert_eq!(snapshot.percentage, 50.0);
    assert_eq!(snapshot.completed_steps(), 2);
    assert_eq!(
        snapshot.active_step().map(|step| step.name.as_str()),
        Some("Risk Assessment")
    );
}

#[tokio::test]
async fn progress_with_unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend(&server).progress("r1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn progress_times_out_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/r1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"progress": 10}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let settings = ApiSettings {
        poll_timeout: Duration::from_millis(50),
        ..ApiSettings::with_base_url(server.uri())
    };
    let backend = ReqwestBackend::new(settings).expect("backend");
    let err = backend.progress("r1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn complete_summary_returns_payload_slices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/complete-summary/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary_tab": {"summary": "Lease"},
            "risk_analysis_tab": {"risks": []}
        })))
        .mount(&server)
        .await;

    let payload = backend(&server)
        .complete_summary("r1")
        .await
        .expect("payload ok");
    assert_eq!(
        payload.slice(TabKind::Summary),
        Some(&json!({"summary": "Lease"}))
    );
    assert_eq!(
        payload.missing_slices(),
        vec![TabKind::FinancialTerms, TabKind::Quality, TabKind::AuditTrail]
    );
}

#[tokio::test]
async fn complete_summary_rejects_non_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/complete-summary/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["summary"])))
        .mount(&server)
        .await;

    let err = backend(&server).complete_summary("r1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn tab_endpoint_uses_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/risk-analysis-tab/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"risks": [1, 2]})))
        .expect(1)
        .mount(&server)
        .await;

    let data = backend(&server)
        .tab("r1", TabKind::RiskAnalysis)
        .await
        .expect("tab ok");
    assert_eq!(data, json!({"risks": [1, 2]}));
}

#[tokio::test]
async fn chat_posts_message_with_context() {
    let server = MockServer::start().await;
    let context = json!({"summary_tab": {"summary": "Lease"}});
    Mock::given(method("POST"))
        .and(path("/api/chat/r1"))
        .and(body_json(json!({"message": "Who pays rent?", "context": context})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "The tenant."})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend(&server)
        .chat("r1", "Who pays rent?", &context)
        .await
        .expect("chat ok");
    assert_eq!(reply, "The tenant.");
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gateway/api/progress/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"progress": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let backend =
        ReqwestBackend::new(ApiSettings::with_base_url(format!("{}/gateway", server.uri())))
            .expect("backend");
    let snapshot = backend.progress("r1").await.expect("progress ok");
    assert_eq!(snapshot.percentage, 5.0);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestBackend::new(ApiSettings::with_base_url("not a url")).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
