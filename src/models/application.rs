use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an application. Advances forward only; `Failed` is reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Received,
    Analyzed,
    Rejected,
    AwaitingConfirmation,
    Scheduled,
    Failed,
}

impl ApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Scheduled | ApplicationStatus::Failed
        )
    }

    fn rank(&self) -> u8 {
        match self {
            ApplicationStatus::Received => 0,
            ApplicationStatus::Analyzed => 1,
            ApplicationStatus::Rejected | ApplicationStatus::AwaitingConfirmation => 2,
            ApplicationStatus::Scheduled => 3,
            ApplicationStatus::Failed => 4,
        }
    }

    pub fn can_advance_to(&self, next: ApplicationStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == ApplicationStatus::Failed {
            return true;
        }
        next.rank() > self.rank()
    }
}

/// Structured result of the language-understanding pass over a resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub skills: Vec<String>,
    pub education: String,
    pub experience: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub phone: Option<String>,
    pub analysis: Option<ResumeAnalysis>,
    pub status: ApplicationStatus,
    pub decision_reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn new(candidate_name: String, candidate_email: String, phone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            candidate_name,
            candidate_email,
            phone,
            analysis: None,
            status: ApplicationStatus::Received,
            decision_reasons: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One candidate interview time. Generated in batches; only the slot the
/// candidate confirms ever becomes a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedSlot {
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
}
