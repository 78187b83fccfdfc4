use crate::error::{Error, Result};
use crate::services::application_service::ApplicationService;
use crate::services::calendar_service::{CalendarApi, CalendarEvent};
use crate::services::token_service::TokenService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const INTERVIEW_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub event_id: String,
    pub time: DateTime<Utc>,
}

/// Consumes a confirmation token and commits the calendar booking.
///
/// Token verification itself is stateless, so concurrent attempts with the
/// same token all verify. The booking step is the guarded resource: entries
/// are keyed by the token's deterministic fields (email, proposed time) and
/// the registry lock is held across the calendar call, so a repeated
/// confirmation returns the existing booking instead of creating a second
/// event.
pub struct ConfirmationService {
    tokens: TokenService,
    calendar: Arc<dyn CalendarApi>,
    applications: Arc<ApplicationService>,
    bookings: Mutex<HashMap<(String, DateTime<Utc>), BookingConfirmation>>,
}

impl ConfirmationService {
    pub fn new(
        tokens: TokenService,
        calendar: Arc<dyn CalendarApi>,
        applications: Arc<ApplicationService>,
    ) -> Self {
        Self {
            tokens,
            calendar,
            applications,
            bookings: Mutex::new(HashMap::new()),
        }
    }

    pub async fn confirm(&self, token: &str, now: DateTime<Utc>) -> Result<BookingConfirmation> {
        let claim = self.tokens.verify(token, now)?;
        let key = (claim.email.clone(), claim.proposed_time);

        let mut bookings = self.bookings.lock().await;
        if let Some(existing) = bookings.get(&key) {
            tracing::info!(
                email = %claim.email,
                time = %claim.proposed_time,
                event_id = %existing.event_id,
                "repeat confirmation, returning existing booking"
            );
            return Ok(existing.clone());
        }

        let event = CalendarEvent::interview(
            &claim.email,
            claim.proposed_time,
            INTERVIEW_DURATION_MINUTES,
        );
        let event_id = self.calendar.create_event(&event).await.map_err(|e| {
            tracing::error!(email = %claim.email, "calendar booking failed: {:?}", e);
            Error::SchedulingFailed(e.to_string())
        })?;

        let confirmation = BookingConfirmation {
            event_id,
            time: claim.proposed_time,
        };
        bookings.insert(key, confirmation.clone());
        drop(bookings);

        self.applications.mark_scheduled_by_email(&claim.email);
        tracing::info!(
            email = %claim.email,
            time = %claim.proposed_time,
            event_id = %confirmation.event_id,
            "interview booked"
        );
        Ok(confirmation)
    }
}
