use std::time::Duration;

use portfolio_mailer::configuration::ContactFormSettings;
use portfolio_mailer::contact_form::ContactClient;
use portfolio_mailer::contact_form::ContactForm;
use portfolio_mailer::contact_form::FormFields;
use portfolio_mailer::contact_form::FormState;
use portfolio_mailer::contact_form::SubmitOutcome;
use serde_json::json;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;
use crate::helpers::RecordingTransport;

fn jane() -> FormFields {
    FormFields {
        from_name: "Jane".to_string(),
        reply_to: "jane@example.com".to_string(),
        message: "Hi\nthere".to_string(),
    }
}

fn accepted() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"success": true, "message": "Email sent successfully!"}))
}

async fn form_for(
    server: &MockServer,
    display_for: Duration,
) -> ContactForm {
    let form = ContactForm::new(ContactClient::new(&server.uri()), display_for);
    form.set_fields(jane()).await;
    form
}

#[tokio::test]
async fn success_clears_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .and(body_json(json!({
            "from_name": "Jane",
            "reply_to": "jane@example.com",
            "message": "Hi\nthere",
        })))
        .respond_with(accepted())
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_secs(4)).await;
    assert_eq!(form.state().await, FormState::Idle);

    assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
    assert_eq!(
        form.state().await,
        FormState::Success("Email sent successfully!".to_string())
    );
    assert_eq!(form.fields().await, FormFields::default());
}

#[tokio::test]
async fn rejection_keeps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "Failed to send email", "details": "535"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_secs(4)).await;

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert_eq!(
        form.state().await,
        FormState::Failure(
            "Failed to send message: Failed to send email. Please try again later.".to_string()
        )
    );
    assert_eq!(form.fields().await, jane());
}

#[tokio::test]
async fn unreadable_response_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_secs(4)).await;

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert!(matches!(
        form.state().await,
        FormState::Failure(msg) if msg.starts_with("Failed to send message: ")
    ));
    assert_eq!(form.fields().await, jane());
}

#[tokio::test]
async fn unreachable_relay_is_a_failure() {
    // nothing listens on port 1
    let form = ContactForm::new(ContactClient::new("http://127.0.0.1:1"), Duration::from_secs(4));
    form.set_fields(jane()).await;

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert!(matches!(form.state().await, FormState::Failure(_)));
    assert_eq!(form.fields().await, jane());
}

/// A second submit while the first is in flight issues no request
#[tokio::test]
async fn submit_is_inert_while_submitting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(accepted().set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_secs(4)).await;

    let observe = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = form.state().await;
        assert!(!state.submit_enabled());
        state
    };
    let (first, second, during) = tokio::join!(form.submit(), form.submit(), observe);

    assert_eq!(first, SubmitOutcome::Succeeded);
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(during, FormState::Submitting);
}

/// Giving up on `submit` (teardown, a timeout) leaves the request running
#[tokio::test]
async fn dropped_submit_still_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(accepted().set_delay(Duration::from_millis(300)))
        .expect(2)
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_millis(200)).await;

    assert!(tokio::time::timeout(Duration::from_millis(50), form.submit())
        .await
        .is_err());
    assert_eq!(form.state().await, FormState::Submitting);

    // lands at ~300ms, reverts at ~500ms
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(
        form.state().await,
        FormState::Success("Email sent successfully!".to_string())
    );
    assert_eq!(form.fields().await, FormFields::default());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(form.state().await, FormState::Idle);

    // not stuck: the next submit goes out
    form.set_fields(jane()).await;
    assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
}

/// Both notices disappear on their own
#[tokio::test]
async fn notices_revert_to_idle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(accepted())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "All fields are required"})))
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_millis(100)).await;

    assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
    assert!(matches!(form.state().await, FormState::Success(_)));
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(form.state().await, FormState::Idle);

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert!(matches!(form.state().await, FormState::Failure(_)));
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(form.state().await, FormState::Idle);
}

/// A stale revert must not clear a newer notice
#[tokio::test]
async fn resubmitting_restarts_the_timer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Failed to send email", "details": "x"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(accepted().set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let form = form_for(&server, Duration::from_millis(300)).await;

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    // resubmit right away; the first revert fires while this one is in
    // flight, and again shortly after it lands
    assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(matches!(form.state().await, FormState::Success(_)));
}

/// The client against the real relay
#[tokio::test]
async fn end_to_end() {
    let app = spawn_app().await;
    let form = ContactForm::from_settings(&ContactFormSettings {
        base_url: format!("{}/", app.addr),
        display_milliseconds: 4000,
    });
    form.set_fields(jane()).await;

    assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
    assert_eq!(app.sent().len(), 2);
    assert!(app.sent()[0].html_body.contains("Hi<br>there"));
}

#[tokio::test]
async fn end_to_end_delivery_failure() {
    let transport = RecordingTransport::default();
    transport.fail_attempt(1, "connection reset");
    let app = crate::helpers::spawn_app_with(transport).await;
    let form = ContactForm::new(ContactClient::new(&app.addr), Duration::from_secs(4));
    form.set_fields(jane()).await;

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert_eq!(
        form.state().await,
        FormState::Failure(
            "Failed to send message: Failed to send email. Please try again later.".to_string()
        )
    );
    assert_eq!(form.fields().await, jane());
    assert_eq!(app.sent().len(), 1);
}

#[test]
fn endpoint_is_normalised() {
    assert_eq!(
        ContactClient::new("http://localhost:5000/").endpoint(),
        "http://localhost:5000/api/contact"
    );
    assert_eq!(
        ContactClient::new("http://localhost:5000").endpoint(),
        "http://localhost:5000/api/contact"
    );
}
