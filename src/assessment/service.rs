use std::sync::Arc;

use chrono::Utc;

use super::classification::tables::{CountryRuleTable, SectorTable, TableIntegrityError};
use super::classification::ClassificationEngine;
use super::domain::{
    AnalysisResult, Answer, ClassificationOutcome, EvidenceDescriptor, OrganizationId,
    OrganizationProfile, QuestionId,
};
use super::repository::{AssessmentRepository, RepositoryError};
use super::scoring::catalog::{CatalogIntegrityError, CategoryCatalog, QuestionCatalog};
use super::scoring::{ScoringConfig, ScoringEngine};

/// One user action: pick an option for a question, optionally attach proof.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub option: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceDescriptor>,
}

/// Facade composing the rule tables, catalogs, both engines, and a
/// repository. Engines re-run on every read; the service only moves
/// snapshots in and out of storage.
pub struct AssessmentService<R> {
    repository: Arc<R>,
    sectors: Arc<SectorTable>,
    countries: Arc<CountryRuleTable>,
    catalog: Arc<QuestionCatalog>,
    categories: Arc<CategoryCatalog>,
    scoring: ScoringEngine,
}

impl<R> AssessmentService<R>
where
    R: AssessmentRepository + 'static,
{
    /// Wire the service against the shipped NIS2 data set.
    pub fn new(repository: Arc<R>, config: ScoringConfig) -> Result<Self, StartupError> {
        Self::with_tables(
            repository,
            Arc::new(SectorTable::nis2()),
            Arc::new(CountryRuleTable::eu27()),
            Arc::new(QuestionCatalog::nis2()),
            Arc::new(CategoryCatalog::nis2()),
            config,
        )
    }

    /// Wire the service against caller-supplied tables, verifying their
    /// internal consistency once, up front.
    pub fn with_tables(
        repository: Arc<R>,
        sectors: Arc<SectorTable>,
        countries: Arc<CountryRuleTable>,
        catalog: Arc<QuestionCatalog>,
        categories: Arc<CategoryCatalog>,
        config: ScoringConfig,
    ) -> Result<Self, StartupError> {
        countries.verify_integrity(&sectors)?;
        catalog.verify_integrity(&categories)?;

        Ok(Self {
            repository,
            sectors,
            countries,
            catalog,
            categories,
            scoring: ScoringEngine::new(config),
        })
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// Store a profile snapshot and return the fresh classification; invalid
    /// profiles are stored too so the caller can keep editing, but the
    /// outcome carries the field errors instead of a verdict.
    pub fn upsert_profile(
        &self,
        profile: OrganizationProfile,
    ) -> Result<ClassificationOutcome, AssessmentServiceError> {
        let outcome =
            ClassificationEngine::new(&self.sectors, &self.countries).classify(&profile);
        self.repository.upsert_profile(profile)?;
        Ok(outcome)
    }

    /// Re-run classification for the stored profile.
    pub fn classification(
        &self,
        id: &OrganizationId,
    ) -> Result<ClassificationOutcome, AssessmentServiceError> {
        let profile = self
            .repository
            .profile(id)?
            .ok_or_else(|| AssessmentServiceError::ProfileNotFound(id.0.clone()))?;
        Ok(ClassificationEngine::new(&self.sectors, &self.countries).classify(&profile))
    }

    /// Record an answer with copy-on-answer semantics: score and maturity are
    /// copied from the selected option now and never re-derived, so later
    /// catalog edits cannot rewrite history. Returns the refreshed analysis.
    pub fn record_answer(
        &self,
        id: &OrganizationId,
        submission: AnswerSubmission,
    ) -> Result<AnalysisResult, AssessmentServiceError> {
        let question = self.catalog.question(&submission.question_id).ok_or_else(|| {
            AssessmentServiceError::UnknownQuestion(submission.question_id.0.clone())
        })?;
        let option = question.option(&submission.option).ok_or_else(|| {
            AssessmentServiceError::UnknownOption {
                question: submission.question_id.0.clone(),
                option: submission.option.clone(),
            }
        })?;

        let answer = Answer {
            question_id: submission.question_id.clone(),
            selected_option: option.value.to_string(),
            score: option.score,
            maturity: option.maturity,
            recorded_at: Utc::now().naive_utc(),
            evidence: submission.evidence,
        };
        self.repository.record_answer(id, answer)?;

        self.analysis(id)
    }

    /// Re-run the scoring engine against the stored answers. An organization
    /// with no answers yields the zeroed base-case result.
    pub fn analysis(&self, id: &OrganizationId) -> Result<AnalysisResult, AssessmentServiceError> {
        let answers = self.repository.answers(id)?;
        Ok(self
            .scoring
            .analyze(&answers, &self.catalog, &self.categories))
    }
}

/// Fatal wiring-time failure: the injected tables are inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Tables(#[from] TableIntegrityError),
    #[error(transparent)]
    Catalog(#[from] CatalogIntegrityError),
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("question '{0}' is not in the catalog")]
    UnknownQuestion(String),
    #[error("option '{option}' is not defined for question '{question}'")]
    UnknownOption { question: String, option: String },
    #[error("organization '{0}' has no stored profile")]
    ProfileNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
