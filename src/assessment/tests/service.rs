use std::sync::Arc;

use super::common::*;
use crate::assessment::domain::{Category, EntityType, MaturityLevel, QuestionId, Sector};
use crate::assessment::repository::{AssessmentRepository, MemoryAssessmentRepository};
use crate::assessment::scoring::catalog::CategoryCatalog;
use crate::assessment::scoring::ScoringConfig;
use crate::assessment::service::{AnswerSubmission, AssessmentService, AssessmentServiceError};
use crate::assessment::{CountryRuleTable, SectorTable};

fn submission(question_id: &str, option: &str) -> AnswerSubmission {
    AnswerSubmission {
        question_id: QuestionId(question_id.to_string()),
        option: option.to_string(),
        evidence: Vec::new(),
    }
}

#[test]
fn upsert_profile_classifies_and_stores() {
    let (service, repository) = build_service();

    let outcome = service
        .upsert_profile(profile(Sector::Banking))
        .expect("profile stored");

    assert_eq!(outcome.entity_type(), Some(EntityType::Essential));
    assert!(repository
        .profile(&org())
        .expect("repository reachable")
        .is_some());

    let again = service.classification(&org()).expect("profile on record");
    assert_eq!(outcome, again);
}

#[test]
fn invalid_profile_is_stored_with_errors_attached() {
    let (service, _) = build_service();

    let mut profile = profile(Sector::PublicAdministration);
    profile.population_served_percent = None;

    let outcome = service.upsert_profile(profile).expect("stored regardless");
    assert!(outcome.verdict.is_none());
    assert!(!outcome.errors.is_empty());

    // The caller can keep editing: the invalid snapshot is on record.
    let fetched = service.classification(&org()).expect("profile on record");
    assert!(fetched.verdict.is_none());
}

#[test]
fn classification_for_unknown_organization_is_an_error() {
    let (service, _) = build_service();

    match service.classification(&org()) {
        Err(AssessmentServiceError::ProfileNotFound(id)) => assert_eq!(id, "org-001"),
        other => panic!("expected profile-not-found, got {other:?}"),
    }
}

#[test]
fn record_answer_copies_score_and_maturity_from_the_option() {
    let (service, repository) = build_service();

    let analysis = service
        .record_answer(&org(), submission("risk-mgmt-policies", "largely-compliant"))
        .expect("answer recorded");

    let risk = analysis
        .category_score(Category::RiskManagement)
        .expect("category present");
    assert_eq!(risk.score, 75);
    assert_eq!(risk.answered_count, 1);

    let stored = repository.answers(&org()).expect("repository reachable");
    let answer = &stored[&QuestionId("risk-mgmt-policies".to_string())];
    assert_eq!(answer.score, 75);
    assert_eq!(answer.maturity, MaturityLevel::Managed);
    assert_eq!(answer.selected_option, "largely-compliant");
}

#[test]
fn reanswering_replaces_instead_of_appending() {
    let (service, repository) = build_service();

    service
        .record_answer(&org(), submission("risk-mgmt-policies", "non-compliant"))
        .expect("first answer");
    let analysis = service
        .record_answer(&org(), submission("risk-mgmt-policies", "fully-compliant"))
        .expect("second answer");

    let stored = repository.answers(&org()).expect("repository reachable");
    assert_eq!(stored.len(), 1);
    assert_eq!(analysis.overall_score, 100);
}

#[test]
fn unknown_question_and_option_are_rejected() {
    let (service, _) = build_service();

    match service.record_answer(&org(), submission("retired-question", "fully-compliant")) {
        Err(AssessmentServiceError::UnknownQuestion(id)) => {
            assert_eq!(id, "retired-question");
        }
        other => panic!("expected unknown question, got {other:?}"),
    }

    match service.record_answer(&org(), submission("risk-mgmt-policies", "sort-of")) {
        Err(AssessmentServiceError::UnknownOption { question, option }) => {
            assert_eq!(question, "risk-mgmt-policies");
            assert_eq!(option, "sort-of");
        }
        other => panic!("expected unknown option, got {other:?}"),
    }
}

#[test]
fn analysis_without_answers_is_the_zeroed_base_case() {
    let (service, _) = build_service();

    let analysis = service.analysis(&org()).expect("empty analysis");
    assert_eq!(analysis.overall_score, 0);
    assert_eq!(analysis.completion_rate, 0);
}

#[test]
fn catalog_edits_never_rewrite_recorded_scores() {
    let repository = Arc::new(MemoryAssessmentRepository::default());

    let generous = fixture_catalog();
    let service = AssessmentService::with_tables(
        repository.clone(),
        Arc::new(SectorTable::nis2()),
        Arc::new(CountryRuleTable::eu27()),
        Arc::new(generous),
        Arc::new(CategoryCatalog::nis2()),
        ScoringConfig::default(),
    )
    .expect("fixture tables are consistent");

    service
        .record_answer(&org(), submission("rm-1", "fully-compliant"))
        .expect("answer recorded");

    // Re-wire the service with a catalog that downgrades the same option.
    let mut stingier_questions = vec![fixture_question(
        "rm-1",
        Category::RiskManagement,
        "NIS2-20.1",
        vec![graded_option("fully-compliant", 10, MaturityLevel::Defined)],
    )];
    stingier_questions.extend(
        fixture_catalog()
            .questions()
            .iter()
            .filter(|question| question.id != "rm-1")
            .cloned(),
    );
    let rescored = AssessmentService::with_tables(
        repository,
        Arc::new(SectorTable::nis2()),
        Arc::new(CountryRuleTable::eu27()),
        Arc::new(crate::assessment::QuestionCatalog::from_parts(
            stingier_questions,
            fixture_controls(),
        )),
        Arc::new(CategoryCatalog::nis2()),
        ScoringConfig::default(),
    )
    .expect("fixture tables are consistent");

    let analysis = rescored.analysis(&org()).expect("analysis recomputed");

    // The stored answer keeps the score it was recorded with.
    assert_eq!(analysis.overall_score, 100);
}

#[test]
fn startup_rejects_inconsistent_catalogs() {
    let repository = Arc::new(MemoryAssessmentRepository::default());

    let broken = crate::assessment::QuestionCatalog::from_parts(
        vec![fixture_question(
            "rm-1",
            Category::RiskManagement,
            "NIS2-404",
            vec![graded_option("fully-compliant", 100, MaturityLevel::Optimized)],
        )],
        fixture_controls(),
    );

    let result = AssessmentService::with_tables(
        repository,
        Arc::new(SectorTable::nis2()),
        Arc::new(CountryRuleTable::eu27()),
        Arc::new(broken),
        Arc::new(CategoryCatalog::nis2()),
        ScoringConfig::default(),
    );

    assert!(result.is_err());
}
