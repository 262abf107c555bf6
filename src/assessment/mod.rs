//! NIS2 self-assessment core: entity classification and compliance scoring.
//!
//! Both engines are pure functions over explicit inputs: a profile plus the
//! injected rule tables, or an answer map plus the question catalog. The
//! service and router wrap them for storage and HTTP delivery; nothing in
//! here performs I/O of its own.

pub mod classification;
pub mod domain;
pub mod importer;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use classification::tables::{
    CountryRule, CountryRuleTable, SectorRule, SectorTable, SectorTier, SizeThresholds,
    TranspositionStatus,
};
pub use classification::ClassificationEngine;
pub use domain::{
    AnalysisResult, Answer, AnswerMap, Category, CategoryScore, ClassificationOutcome,
    ClassificationResult, CountryCode, EntityType, EvidenceDescriptor, EvidenceKind, FieldError,
    Gap, MaturityCount, MaturityLevel, OrganizationId, OrganizationProfile, Priority, QuestionId,
    Recommendation, RequirementSet, Sector, SizeCategory,
};
pub use importer::{AnswerCsvImporter, AnswerImport, AnswerImportError, SkippedAnswerRow};
pub use repository::{
    AssessmentRecord, AssessmentRepository, MemoryAssessmentRepository, RepositoryError,
};
pub use router::assessment_router;
pub use scoring::catalog::{CategoryCatalog, QuestionCatalog};
pub use scoring::{ScoringConfig, ScoringEngine};
pub use service::{AnswerSubmission, AssessmentService, AssessmentServiceError, StartupError};
pub use validation::{ProfileValidator, ProfileWarning, ValidationIssue, ValidationReport};
