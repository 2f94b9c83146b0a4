//! Integration tests for the HTTP analysis client and the Analyze session.
//!
//! These run against a fake analysis service on a local port, so the
//! real request encoding and response normalization are exercised.

mod common;

use std::sync::Mutex;
use std::time::Duration;

use common::{spawn_fake_backend, unreachable_base_url, Recorded};
use factlens_core::error::UNREACHABLE_MESSAGE;
use factlens_core::{
    AnalysisBackend, AnalysisRequest, AnalyzeSession, FactlensError, HttpAnalysisClient,
    ImageUpload, Notifier, ResultView, Verdict,
};
use factlens_report::{json::JsonGenerator, AnalysisReport, MarkdownGenerator, Report};

/// Notifier that keeps every message it is asked to show.
#[derive(Default)]
struct CollectingNotifier {
    shown: Mutex<Vec<String>>,
}

impl Notifier for CollectingNotifier {
    fn show_error(&self, message: &str) {
        self.shown.lock().unwrap().push(message.to_string());
    }
}

impl CollectingNotifier {
    fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

// ============================================================================
// Client Tests
// ============================================================================

#[tokio::test]
async fn test_text_claim_is_posted_as_json() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);

    let result = client
        .analyze_text("The Eiffel Tower is in Paris")
        .await
        .expect("analysis should succeed");

    assert_eq!(result.credibility_score, 82);
    assert_eq!(result.risk_level.as_deref(), Some("Low"));
    let explanation = result.explanation.expect("explanation present");
    assert_eq!(
        explanation.why_flagged.as_deref(),
        Some("Matches multiple wire reports")
    );
    assert_eq!(explanation.supporting_evidence.len(), 6);

    assert_eq!(
        fake.requests(),
        vec![Recorded::Text("The Eiffel Tower is in Paris".to_string())]
    );
}

#[tokio::test]
async fn test_url_response_envelope_is_unwrapped() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&format!("{}/", fake.base_url));

    let result = client
        .analyze_url("https://example.com/story")
        .await
        .expect("analysis should succeed");

    // 55.4 rounds to 55
    assert_eq!(result.credibility_score, 55);
    assert_eq!(Verdict::from_score(result.credibility_score), Verdict::MostlyFake);
    assert!(result.explanation.is_none());
    assert_eq!(
        fake.requests(),
        vec![Recorded::Url("https://example.com/story".to_string())]
    );
}

#[tokio::test]
async fn test_image_is_sent_as_multipart_field() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);
    let image = ImageUpload::new("scan.png", "image/png", vec![0x89; 16]).unwrap();

    let result = client
        .analyze_image(&image)
        .await
        .expect("analysis should succeed");

    assert_eq!(result.credibility_score, 12);
    let explanation = result.explanation.expect("explanation present");
    assert!(explanation.supporting_evidence.is_empty());
    assert_eq!(
        fake.requests(),
        vec![Recorded::Image {
            filename: "scan.png".to_string(),
            content_type: "image/png".to_string(),
            len: 16,
        }]
    );
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);

    let err = client.analyze_text("boom").await.unwrap_err();

    match &err {
        FactlensError::Backend { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "Model unavailable");
        }
        other => panic!("expected Backend error, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Model unavailable");
}

#[tokio::test]
async fn test_empty_error_body_uses_status_message() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);

    let err = client.analyze_text("teapot").await.unwrap_err();

    assert_eq!(err.user_message(), "Request failed with status code 418");
}

#[tokio::test]
async fn test_unreachable_service_is_rewritten() {
    let client = HttpAnalysisClient::new(&unreachable_base_url());

    let err = client.analyze_text("anything").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.to_string(), "Network Error");
    assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
}

#[tokio::test]
async fn test_configured_timeout_is_enforced() {
    let fake = spawn_fake_backend().await;
    let client =
        HttpAnalysisClient::new(&fake.base_url).with_timeout(Duration::from_millis(100));

    let err = client.analyze_text("slow").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.user_message(), "timeout of 100ms exceeded");
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_session_submit_renders_result() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);
    let notifier = CollectingNotifier::default();
    let mut session = AnalyzeSession::new();

    session.set_input_text("  Water boils at 100C at sea level  ");
    let result = session
        .submit(&client, &notifier)
        .await
        .expect("submit should succeed")
        .clone();

    let view = ResultView::from_result(&result);
    assert_eq!(view.verdict, Verdict::True);
    assert_eq!(view.evidence.len(), 5);
    assert!(!session.is_busy());
    assert!(session.error().is_none());
    assert!(notifier.shown().is_empty());

    // Trimmed before sending
    assert_eq!(
        fake.requests(),
        vec![Recorded::Text("Water boils at 100C at sea level".to_string())]
    );
}

#[tokio::test]
async fn test_session_url_input_routes_to_url_operation() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);
    let mut session = AnalyzeSession::new();

    session.set_input_text("HTTPS://example.com/a");
    session
        .submit(&client, &factlens_core::NoopNotifier)
        .await
        .expect("submit should succeed");

    assert_eq!(
        fake.requests(),
        vec![Recorded::Url("HTTPS://example.com/a".to_string())]
    );
}

#[tokio::test]
async fn test_session_image_wins_over_text() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);
    let mut session = AnalyzeSession::new();

    session.set_input_text("https://example.com/ignored");
    session.attach_image(ImageUpload::new("meme.jpg", "image/jpeg", vec![1, 2, 3]).unwrap());
    session
        .submit(&client, &factlens_core::NoopNotifier)
        .await
        .expect("submit should succeed");

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    assert!(matches!(&requests[0], Recorded::Image { filename, .. } if filename == "meme.jpg"));
}

#[tokio::test]
async fn test_session_failure_notifies_and_clears_busy() {
    let client = HttpAnalysisClient::new(&unreachable_base_url());
    let notifier = CollectingNotifier::default();
    let mut session = AnalyzeSession::new();

    session.set_input_text("Some claim");
    let err = session.submit(&client, &notifier).await.unwrap_err();

    assert!(err.is_transport());
    assert!(!session.is_busy());
    assert!(session.result().is_none());
    assert_eq!(session.error(), Some(UNREACHABLE_MESSAGE));
    assert_eq!(notifier.shown(), vec![UNREACHABLE_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_session_empty_input_never_calls_service() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);
    let notifier = CollectingNotifier::default();
    let mut session = AnalyzeSession::new();

    session.set_input_text("   ");
    let err = session.submit(&client, &notifier).await.unwrap_err();

    assert!(err.is_validation());
    assert!(fake.requests().is_empty());
    assert!(notifier.shown().is_empty());
}

// ============================================================================
// Report Tests
// ============================================================================

#[tokio::test]
async fn test_report_from_live_analysis() {
    let fake = spawn_fake_backend().await;
    let client = HttpAnalysisClient::new(&fake.base_url);
    let request = AnalysisRequest::Text {
        text: "Honey never spoils".to_string(),
    };

    let result = client.dispatch(&request).await.expect("analysis succeeds");
    let report = Report::builder()
        .analysis(AnalysisReport::new(&request, result))
        .try_build()
        .expect("report has an analysis");

    let markdown = MarkdownGenerator::new(&report).generate();
    assert!(markdown.contains("| Verdict | True |"));
    assert!(markdown.contains("5. NPR"));
    assert!(!markdown.contains("DW"));

    let json: serde_json::Value =
        serde_json::from_str(&JsonGenerator::new(&report).generate().unwrap()).unwrap();
    assert_eq!(json["analysis"]["subject"], "Honey never spoils");
    assert_eq!(json["analysis"]["view"]["variant"], "success");
}
