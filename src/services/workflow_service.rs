use crate::config::JobRequirements;
use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatus, ResumeAnalysis};
use crate::services::analyzer_service::ResumeAnalyzer;
use crate::services::application_service::ApplicationService;
use crate::services::eligibility_service::{EligibilityDecision, EligibilityEvaluator};
use crate::services::email_service::EmailService;
use crate::services::slot_service::SlotGenerator;
use crate::services::token_service::TokenService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Validated candidate input entering the pipeline. Resume text is owned by
/// this run and dropped with it.
#[derive(Debug, Clone)]
pub struct ApplicationSubmission {
    pub candidate_name: String,
    pub candidate_email: String,
    pub phone: Option<String>,
    pub resume_text: String,
    pub cover_letter_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationOutcome {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub analysis: ResumeAnalysis,
    pub should_interview: bool,
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proposed_times: Vec<DateTime<Utc>>,
}

/// Drives one application through Analyze -> Evaluate -> (Invite | Reject).
/// Each stage awaits its predecessor; any collaborator failure is terminal
/// for the run and leaves the record `Failed`, never silently mid-pipeline.
#[derive(Clone)]
pub struct WorkflowEngine {
    analyzer: ResumeAnalyzer,
    evaluator: EligibilityEvaluator,
    slots: SlotGenerator,
    tokens: TokenService,
    email: EmailService,
    applications: Arc<ApplicationService>,
    requirements: JobRequirements,
    base_url: String,
}

impl WorkflowEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        analyzer: ResumeAnalyzer,
        evaluator: EligibilityEvaluator,
        slots: SlotGenerator,
        tokens: TokenService,
        email: EmailService,
        applications: Arc<ApplicationService>,
        requirements: JobRequirements,
        base_url: String,
    ) -> Self {
        Self {
            analyzer,
            evaluator,
            slots,
            tokens,
            email,
            applications,
            requirements,
            base_url,
        }
    }

    /// `now` is read once by the caller and injected, so slot generation and
    /// the token batch are deterministic for this invocation.
    pub async fn process_application(
        &self,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Result<ApplicationOutcome> {
        let record = self.applications.create(
            submission.candidate_name.clone(),
            submission.candidate_email.clone(),
            submission.phone.clone(),
        );
        tracing::info!(id = %record.id, email = %record.candidate_email, "application received");

        let analysis = match self
            .analyzer
            .analyze(
                &submission.resume_text,
                submission.cover_letter_text.as_deref(),
                &self.requirements,
            )
            .await
        {
            Ok(analysis) => analysis,
            Err(err) => {
                self.fail(record.id);
                return Err(err);
            }
        };

        self.applications.set_analysis(record.id, analysis.clone())?;
        self.applications
            .advance(record.id, ApplicationStatus::Analyzed)?;

        let decision = self.evaluator.evaluate(&analysis);
        self.applications
            .set_decision_reasons(record.id, decision.reasons.clone())?;

        if !decision.should_interview {
            return self.reject(record.id, analysis, decision);
        }

        self.propose_and_invite(record.id, &submission, analysis, decision, now)
            .await
    }

    fn reject(
        &self,
        id: Uuid,
        analysis: ResumeAnalysis,
        decision: EligibilityDecision,
    ) -> Result<ApplicationOutcome> {
        self.applications.advance(id, ApplicationStatus::Rejected)?;
        tracing::info!(%id, reasons = ?decision.reasons, "application rejected");
        Ok(ApplicationOutcome {
            id,
            status: ApplicationStatus::Rejected,
            analysis,
            should_interview: false,
            reasons: decision.reasons,
            proposed_times: Vec::new(),
        })
    }

    async fn propose_and_invite(
        &self,
        id: Uuid,
        submission: &ApplicationSubmission,
        analysis: ResumeAnalysis,
        decision: EligibilityDecision,
        now: DateTime<Utc>,
    ) -> Result<ApplicationOutcome> {
        let slots = self.slots.generate(now);

        // One signing pass for the whole batch: every token carries the same
        // issuance time, so an idempotent retry reproduces identical links.
        let mut offers = Vec::with_capacity(slots.len());
        for slot in &slots {
            let token = self
                .tokens
                .issue(&submission.candidate_email, slot, now)?;
            let link = format!("{}/api/interview/confirm/{}", self.base_url, token);
            offers.push((*slot, link));
        }

        if let Err(err) = self
            .email
            .send_interview_invitation(
                &submission.candidate_email,
                &submission.candidate_name,
                &offers,
            )
            .await
        {
            self.fail(id);
            return Err(err);
        }

        self.applications
            .advance(id, ApplicationStatus::AwaitingConfirmation)?;
        tracing::info!(%id, slots = slots.len(), "invitation sent, awaiting confirmation");

        Ok(ApplicationOutcome {
            id,
            status: ApplicationStatus::AwaitingConfirmation,
            analysis,
            should_interview: true,
            reasons: decision.reasons,
            proposed_times: slots.iter().map(|s| s.start).collect(),
        })
    }

    fn fail(&self, id: Uuid) {
        if let Err(err) = self.applications.advance(id, ApplicationStatus::Failed) {
            tracing::error!(%id, error = %err, "could not mark application failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analyzer_service::LanguageModel;
    use crate::services::email_service::{EmailMessage, EmailSender};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::Value as JsonValue;
    use std::sync::Mutex;

    struct CannedModel(JsonValue);

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete_json(&self, _system: &str, _user: &str) -> anyhow::Result<JsonValue> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete_json(&self, _system: &str, _user: &str) -> anyhow::Result<JsonValue> {
            Err(anyhow::anyhow!("model down"))
        }
    }

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
            if self.fail {
                return Err(anyhow::anyhow!("smtp relay exhausted retries"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn strong_analysis() -> JsonValue {
        serde_json::json!({
            "skills": ["Python", "SQL"],
            "education": "BSc",
            "experience": "4 years",
            "score": 0.8
        })
    }

    fn weak_analysis() -> JsonValue {
        serde_json::json!({
            "skills": ["Python", "SQL"],
            "education": "BSc",
            "experience": "1 year",
            "score": 0.5
        })
    }

    fn submission() -> ApplicationSubmission {
        ApplicationSubmission {
            candidate_name: "Jane Doe".to_string(),
            candidate_email: "jane@example.com".to_string(),
            phone: None,
            resume_text: "Python and SQL developer".to_string(),
            cover_letter_text: None,
        }
    }

    fn reference_now() -> DateTime<Utc> {
        // A Monday.
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn engine(
        model: Arc<dyn LanguageModel>,
        sender: Arc<RecordingSender>,
    ) -> (WorkflowEngine, Arc<ApplicationService>) {
        let applications = Arc::new(ApplicationService::new());
        let engine = WorkflowEngine::new(
            ResumeAnalyzer::new(model),
            EligibilityEvaluator::new(JobRequirements::default()),
            SlotGenerator::default(),
            TokenService::new("test-secret"),
            EmailService::new(sender, "hr@example.com".to_string()),
            applications.clone(),
            JobRequirements::default(),
            "https://hr.example.com".to_string(),
        );
        (engine, applications)
    }

    #[tokio::test]
    async fn qualifying_candidate_gets_one_invitation_with_all_slots() {
        let sender = Arc::new(RecordingSender::default());
        let (engine, applications) =
            engine(Arc::new(CannedModel(strong_analysis())), sender.clone());

        let outcome = engine
            .process_application(submission(), reference_now())
            .await
            .unwrap();

        assert!(outcome.should_interview);
        assert_eq!(outcome.status, ApplicationStatus::AwaitingConfirmation);
        assert_eq!(outcome.proposed_times.len(), 15);
        assert_eq!(
            applications.get(outcome.id).unwrap().status,
            ApplicationStatus::AwaitingConfirmation
        );

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert_eq!(
            sent[0].html_body.matches("/api/interview/confirm/").count(),
            15
        );
    }

    #[tokio::test]
    async fn invitation_tokens_share_one_issuance_time() {
        let sender = Arc::new(RecordingSender::default());
        let (engine, _) = engine(Arc::new(CannedModel(strong_analysis())), sender.clone());
        let now = reference_now();

        engine
            .process_application(submission(), now)
            .await
            .unwrap();

        let tokens = TokenService::new("test-secret");
        let sent = sender.sent.lock().unwrap();
        let body = &sent[0].html_body;
        let mut verified = 0;
        for part in body.split("/api/interview/confirm/").skip(1) {
            let token = part.split('\'').next().unwrap();
            let claim = tokens.verify(token, now).unwrap();
            assert_eq!(claim.email, "jane@example.com");
            assert_eq!(claim.issued_at, now);
            verified += 1;
        }
        assert_eq!(verified, 15);
    }

    #[tokio::test]
    async fn low_score_is_rejected_without_any_email() {
        let sender = Arc::new(RecordingSender::default());
        let (engine, applications) =
            engine(Arc::new(CannedModel(weak_analysis())), sender.clone());

        let outcome = engine
            .process_application(submission(), reference_now())
            .await
            .unwrap();

        assert!(!outcome.should_interview);
        assert_eq!(outcome.status, ApplicationStatus::Rejected);
        assert!(outcome.proposed_times.is_empty());
        assert!(sender.sent.lock().unwrap().is_empty());
        assert_eq!(
            applications.get(outcome.id).unwrap().status,
            ApplicationStatus::Rejected
        );
    }

    #[tokio::test]
    async fn analyzer_failure_marks_the_run_failed() {
        let sender = Arc::new(RecordingSender::default());
        let (engine, applications) = engine(Arc::new(FailingModel), sender);

        let err = engine
            .process_application(submission(), reference_now())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AnalysisFailed(_)));
        let failed = applications
            .get_all_statuses()
            .into_iter()
            .any(|s| s == ApplicationStatus::Failed);
        assert!(failed);
    }

    #[tokio::test]
    async fn exhausted_email_delivery_marks_the_run_failed() {
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..Default::default()
        });
        let (engine, applications) =
            engine(Arc::new(CannedModel(strong_analysis())), sender);

        let err = engine
            .process_application(submission(), reference_now())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvitationFailed(_)));
        let failed = applications
            .get_all_statuses()
            .into_iter()
            .any(|s| s == ApplicationStatus::Failed);
        assert!(failed);
    }
}
