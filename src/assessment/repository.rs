use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::domain::{Answer, AnswerMap, OrganizationId, OrganizationProfile};

/// Persisted state for one organization: the latest profile snapshot plus
/// the keyed answer map (re-answering replaces in place).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub profile: Option<OrganizationProfile>,
    pub answers: AnswerMap,
}

/// Storage abstraction so the service layer can be exercised in isolation.
/// The engines never touch this; they receive plain snapshots.
pub trait AssessmentRepository: Send + Sync {
    fn upsert_profile(&self, profile: OrganizationProfile) -> Result<(), RepositoryError>;
    fn profile(&self, id: &OrganizationId) -> Result<Option<OrganizationProfile>, RepositoryError>;
    fn record_answer(&self, id: &OrganizationId, answer: Answer) -> Result<(), RepositoryError>;
    fn answers(&self, id: &OrganizationId) -> Result<AnswerMap, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store backing the default service wiring; answers to
/// different questions never conflict and same-question writes are
/// last-write-wins.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<OrganizationId, AssessmentRecord>>>,
}

impl MemoryAssessmentRepository {
    fn with_records<T>(
        &self,
        apply: impl FnOnce(&mut HashMap<OrganizationId, AssessmentRecord>) -> T,
    ) -> Result<T, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(apply(&mut guard))
    }
}

impl AssessmentRepository for MemoryAssessmentRepository {
    fn upsert_profile(&self, profile: OrganizationProfile) -> Result<(), RepositoryError> {
        self.with_records(|records| {
            let key = profile.organization_id.clone();
            records.entry(key).or_default().profile = Some(profile);
        })
    }

    fn profile(&self, id: &OrganizationId) -> Result<Option<OrganizationProfile>, RepositoryError> {
        self.with_records(|records| records.get(id).and_then(|record| record.profile.clone()))
    }

    fn record_answer(&self, id: &OrganizationId, answer: Answer) -> Result<(), RepositoryError> {
        self.with_records(|records| {
            records
                .entry(id.clone())
                .or_default()
                .answers
                .insert(answer.question_id.clone(), answer);
        })
    }

    fn answers(&self, id: &OrganizationId) -> Result<AnswerMap, RepositoryError> {
        self.with_records(|records| {
            records
                .get(id)
                .map(|record| record.answers.clone())
                .unwrap_or_default()
        })
    }
}
