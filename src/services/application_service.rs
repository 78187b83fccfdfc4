use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, ApplicationStatus, ResumeAnalysis};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory registry of application runs. Guards the forward-only status
/// invariant; all mutation happens under one lock so no two tasks can
/// advance the same record concurrently. Durable storage is an external
/// collaborator and out of scope.
#[derive(Default)]
pub struct ApplicationService {
    records: Mutex<HashMap<Uuid, ApplicationRecord>>,
}

impl ApplicationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        candidate_name: String,
        candidate_email: String,
        phone: Option<String>,
    ) -> ApplicationRecord {
        let record = ApplicationRecord::new(candidate_name, candidate_email, phone);
        let mut records = self.records.lock().expect("application registry poisoned");
        records.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: Uuid) -> Option<ApplicationRecord> {
        let records = self.records.lock().expect("application registry poisoned");
        records.get(&id).cloned()
    }

    pub fn advance(&self, id: Uuid, next: ApplicationStatus) -> Result<()> {
        let mut records = self.records.lock().expect("application registry poisoned");
        let record = records
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;

        if !record.status.can_advance_to(next) {
            return Err(Error::Internal(format!(
                "Illegal status transition {:?} -> {:?} for application {}",
                record.status, next, id
            )));
        }

        record.status = next;
        record.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_analysis(&self, id: Uuid, analysis: ResumeAnalysis) -> Result<()> {
        let mut records = self.records.lock().expect("application registry poisoned");
        let record = records
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        record.analysis = Some(analysis);
        record.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_decision_reasons(&self, id: Uuid, reasons: Vec<String>) -> Result<()> {
        let mut records = self.records.lock().expect("application registry poisoned");
        let record = records
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        record.decision_reasons = reasons;
        record.updated_at = Utc::now();
        Ok(())
    }

    pub fn get_all_statuses(&self) -> Vec<ApplicationStatus> {
        let records = self.records.lock().expect("application registry poisoned");
        records.values().map(|r| r.status).collect()
    }

    /// Marks the candidate's pending application as scheduled after a
    /// confirmed booking. A missing record is not an error: the registry
    /// only holds the current process's runs while tokens outlive restarts.
    pub fn mark_scheduled_by_email(&self, email: &str) {
        let mut records = self.records.lock().expect("application registry poisoned");
        let pending = records.values_mut().find(|r| {
            r.candidate_email == email && r.status == ApplicationStatus::AwaitingConfirmation
        });
        if let Some(record) = pending {
            record.status = ApplicationStatus::Scheduled;
            record.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_enforces_forward_only_transitions() {
        let svc = ApplicationService::new();
        let record = svc.create("Jane".into(), "jane@example.com".into(), None);

        svc.advance(record.id, ApplicationStatus::Analyzed).unwrap();
        assert!(svc.advance(record.id, ApplicationStatus::Received).is_err());

        svc.advance(record.id, ApplicationStatus::AwaitingConfirmation)
            .unwrap();
        svc.advance(record.id, ApplicationStatus::Scheduled).unwrap();
        assert!(svc.advance(record.id, ApplicationStatus::Failed).is_err());
    }

    #[test]
    fn mark_scheduled_targets_the_awaiting_record() {
        let svc = ApplicationService::new();
        let record = svc.create("Jane".into(), "jane@example.com".into(), None);
        svc.advance(record.id, ApplicationStatus::Analyzed).unwrap();
        svc.advance(record.id, ApplicationStatus::AwaitingConfirmation)
            .unwrap();

        svc.mark_scheduled_by_email("jane@example.com");
        assert_eq!(
            svc.get(record.id).unwrap().status,
            ApplicationStatus::Scheduled
        );

        // Unknown email is a no-op.
        svc.mark_scheduled_by_email("nobody@example.com");
    }
}
