use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use screening_backend::config::Config;
use screening_backend::models::application::ProposedSlot;
use screening_backend::services::analyzer_service::LanguageModel;
use screening_backend::services::calendar_service::{CalendarApi, CalendarEvent};
use screening_backend::services::email_service::{EmailMessage, EmailSender};
use screening_backend::services::token_service::TokenService;
use screening_backend::AppState;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

const SECRET: &str = "test_secret_key";

struct UnusedModel;

#[async_trait]
impl LanguageModel for UnusedModel {
    async fn complete_json(&self, _system: &str, _user: &str) -> anyhow::Result<JsonValue> {
        unreachable!("confirmation flow must not call the language model")
    }
}

struct UnusedSender;

#[async_trait]
impl EmailSender for UnusedSender {
    async fn send(&self, _message: &EmailMessage) -> anyhow::Result<()> {
        unreachable!("confirmation flow must not send email")
    }
}

struct StubCalendar {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl CalendarApi for StubCalendar {
    async fn create_event(&self, _event: &CalendarEvent) -> anyhow::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow::anyhow!("calendar unavailable"));
        }
        Ok(format!("evt-{}", n))
    }
}

fn test_config() -> Config {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", SECRET);
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("EMAIL_GATEWAY_URL", "http://localhost/email");
    env::set_var("EMAIL_GATEWAY_TOKEN", "email-token");
    env::set_var("CALENDAR_API_URL", "http://localhost/calendar");
    env::set_var("CALENDAR_API_TOKEN", "calendar-token");
    env::set_var("BASE_URL", "http://localhost:8000");
    Config::from_env().expect("config")
}

fn setup_app(fail_calendar: bool) -> (Router, Arc<StubCalendar>) {
    let calendar = Arc::new(StubCalendar {
        calls: AtomicUsize::new(0),
        fail: fail_calendar,
    });
    let state = AppState::with_collaborators(
        test_config(),
        Arc::new(UnusedModel),
        Arc::new(UnusedSender),
        calendar.clone(),
    );
    let app = Router::new()
        .route(
            "/api/interview/confirm/:token",
            post(screening_backend::routes::interview::confirm_interview),
        )
        .with_state(state);
    (app, calendar)
}

fn issue_token(offset_from_now: Duration) -> String {
    let slot = ProposedSlot {
        start: Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap(),
        duration_minutes: 60,
    };
    TokenService::new(SECRET)
        .issue("jane@example.com", &slot, Utc::now() + offset_from_now)
        .expect("issue token")
}

async fn confirm(app: &Router, token: &str) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/interview/confirm/{}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn valid_token_books_the_interview() {
    let (app, calendar) = setup_app(false);
    let token = issue_token(Duration::zero());

    let (status, body) = confirm(&app, &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"].as_str(), Some("success"));
    assert_eq!(body["event_id"].as_str(), Some("evt-0"));
    assert!(body["time"].as_str().unwrap().starts_with("2026-09-01T10:00"));
    assert_eq!(calendar.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeat_confirmation_reuses_the_booking() {
    let (app, calendar) = setup_app(false);
    let token = issue_token(Duration::zero());

    let (first_status, first) = confirm(&app, &token).await;
    let (second_status, second) = confirm(&app, &token).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first["event_id"], second["event_id"]);
    assert_eq!(calendar.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_token_is_bad_request() {
    let (app, calendar) = setup_app(false);

    let (status, body) = confirm(&app, "garbage").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid token"));
    assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let (app, calendar) = setup_app(false);
    let token = issue_token(Duration::days(-8));

    let (status, body) = confirm(&app, &token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("expired"));
    assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn calendar_outage_is_reported_not_swallowed() {
    let (app, _calendar) = setup_app(true);
    let token = issue_token(Duration::zero());

    let (status, body) = confirm(&app, &token).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to schedule interview"));
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let (app, calendar) = setup_app(false);
    let slot = ProposedSlot {
        start: Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap(),
        duration_minutes: 60,
    };
    let forged = TokenService::new("some-other-secret")
        .issue("jane@example.com", &slot, Utc::now())
        .unwrap();

    let (status, _) = confirm(&app, &forged).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
}
