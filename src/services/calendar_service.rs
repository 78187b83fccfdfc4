use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;

/// Event to be created in the interviewer's calendar.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee_email: String,
    /// Deterministic per (attendee, start), so the provider can deduplicate
    /// repeated conference-creation requests.
    pub conference_request_id: String,
}

impl CalendarEvent {
    pub fn interview(attendee_email: &str, start: DateTime<Utc>, duration_minutes: i64) -> Self {
        let request_id = format!(
            "interview-{}-{}",
            start.timestamp(),
            attendee_email.replace(['@', '.'], "-")
        );
        Self {
            summary: format!("Interview - {}", attendee_email),
            description: "Video Interview".to_string(),
            start,
            end: start + Duration::minutes(duration_minutes),
            attendee_email: attendee_email.to_string(),
            conference_request_id: request_id,
        }
    }
}

/// Port for the calendar collaborator. Returns the provider's event id.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn create_event(&self, event: &CalendarEvent) -> anyhow::Result<String>;
}

/// Calendar REST client (Google-shaped events API).
pub struct HttpCalendarClient {
    client: Client,
    api_url: String,
    token: String,
}

impl HttpCalendarClient {
    pub fn new(api_url: String, token: String, client: Client) -> Self {
        Self {
            client,
            api_url,
            token,
        }
    }
}

#[async_trait]
impl CalendarApi for HttpCalendarClient {
    async fn create_event(&self, event: &CalendarEvent) -> anyhow::Result<String> {
        let payload = serde_json::json!({
            "summary": event.summary,
            "description": event.description,
            "start": { "dateTime": event.start.to_rfc3339() },
            "end": { "dateTime": event.end.to_rfc3339() },
            "attendees": [ { "email": event.attendee_email } ],
            "conferenceData": {
                "createRequest": {
                    "requestId": event.conference_request_id,
                    "conferenceSolutionKey": { "type": "hangoutsMeet" }
                }
            }
        });

        let url = format!(
            "{}/calendars/primary/events?conferenceDataVersion=1",
            self.api_url.trim_end_matches('/')
        );
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Calendar API error {}: {}", status, text));
        }

        let body: serde_json::Value = res.json().await?;
        body.get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Calendar response missing event id"))
    }
}
