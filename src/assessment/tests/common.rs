use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDateTime;
use serde_json::Value;

use crate::assessment::classification::tables::{CountryRuleTable, SectorTable};
use crate::assessment::classification::ClassificationEngine;
use crate::assessment::domain::{
    Answer, AnswerMap, Category, ClassificationOutcome, ClassificationResult, MaturityLevel,
    OrganizationId, OrganizationProfile, QuestionId, Sector,
};
use crate::assessment::repository::MemoryAssessmentRepository;
use crate::assessment::router::assessment_router;
use crate::assessment::scoring::catalog::{
    AnswerOption, ControlDefinition, Question, QuestionCatalog,
};
use crate::assessment::scoring::{ScoringConfig, ScoringEngine};
use crate::assessment::service::AssessmentService;
use crate::assessment::CountryCode;

pub(super) fn org() -> OrganizationId {
    OrganizationId("org-001".to_string())
}

/// Large-enterprise profile in a quiet member state; tests override the
/// fields they exercise.
pub(super) fn profile(sector: Sector) -> OrganizationProfile {
    let subsector = SectorTable::nis2()
        .rule(sector)
        .and_then(|rule| rule.subsectors.first())
        .map(|name| name.to_string());

    OrganizationProfile {
        organization_id: org(),
        sector,
        subsector,
        employee_count: 500,
        annual_revenue_millions: 120.0,
        country: CountryCode::new("AT"),
        population_served_percent: None,
        cross_border_services: false,
        critical_services_provider: false,
    }
}

pub(super) fn classify(profile: &OrganizationProfile) -> ClassificationOutcome {
    let sectors = SectorTable::nis2();
    let countries = CountryRuleTable::eu27();
    ClassificationEngine::new(&sectors, &countries).classify(profile)
}

pub(super) fn verdict(outcome: &ClassificationOutcome) -> &ClassificationResult {
    outcome
        .verdict
        .as_ref()
        .expect("profile should classify to a verdict")
}

pub(super) fn recorded_at() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 11, 1)
        .expect("valid date")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
}

/// Synthesized stored answer; the score/maturity are already copied onto it,
/// mirroring copy-on-answer.
pub(super) fn answer(question_id: &str, score: u8, maturity: MaturityLevel) -> Answer {
    Answer {
        question_id: QuestionId(question_id.to_string()),
        selected_option: "recorded".to_string(),
        score,
        maturity,
        recorded_at: recorded_at(),
        evidence: Vec::new(),
    }
}

pub(super) fn answer_map(entries: &[(&str, u8, MaturityLevel)]) -> AnswerMap {
    entries
        .iter()
        .map(|(question_id, score, maturity)| {
            (
                QuestionId(question_id.to_string()),
                answer(question_id, *score, *maturity),
            )
        })
        .collect()
}

pub(super) fn scoring_engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default())
}

pub(super) fn fixture_question(
    id: &'static str,
    category: Category,
    control: &'static str,
    options: Vec<AnswerOption>,
) -> Question {
    Question {
        id,
        control,
        category,
        title: id,
        prompt: "fixture prompt",
        legal_basis: "fixture basis",
        options,
        evidence: Vec::new(),
    }
}

pub(super) fn graded_option(value: &'static str, score: u8, maturity: MaturityLevel) -> AnswerOption {
    AnswerOption {
        value,
        label: value,
        score,
        maturity,
    }
}

pub(super) fn fixture_controls() -> Vec<ControlDefinition> {
    vec![
        ControlDefinition {
            id: "NIS2-20.1",
            article: "Article 20",
            title: "Cybersecurity Policies",
            description: "Policies on cybersecurity risk analysis",
            category: Category::RiskManagement,
        },
        ControlDefinition {
            id: "NIS2-20.7",
            article: "Article 20",
            title: "Cryptography and Encryption",
            description: "Policies on the use of cryptography",
            category: Category::Cryptography,
        },
        ControlDefinition {
            id: "NIS2-22.1",
            article: "Article 22",
            title: "Supervision and Enforcement",
            description: "Compliance monitoring",
            category: Category::Compliance,
        },
    ]
}

/// Small catalog: three risk-management questions plus one each for
/// cryptography and compliance, all on the uniform four-tier options.
pub(super) fn fixture_catalog() -> QuestionCatalog {
    let options = || {
        vec![
            graded_option("fully-compliant", 100, MaturityLevel::Optimized),
            graded_option("largely-compliant", 75, MaturityLevel::Managed),
            graded_option("partially-compliant", 50, MaturityLevel::Defined),
            graded_option("non-compliant", 0, MaturityLevel::Initial),
        ]
    };

    QuestionCatalog::from_parts(
        vec![
            fixture_question("rm-1", Category::RiskManagement, "NIS2-20.1", options()),
            fixture_question("rm-2", Category::RiskManagement, "NIS2-20.1", options()),
            fixture_question("rm-3", Category::RiskManagement, "NIS2-20.1", options()),
            fixture_question("crypto-1", Category::Cryptography, "NIS2-20.7", options()),
            fixture_question("comp-1", Category::Compliance, "NIS2-22.1", options()),
        ],
        fixture_controls(),
    )
}

pub(super) fn build_service() -> (
    Arc<AssessmentService<MemoryAssessmentRepository>>,
    Arc<MemoryAssessmentRepository>,
) {
    let repository = Arc::new(MemoryAssessmentRepository::default());
    let service = AssessmentService::new(repository.clone(), ScoringConfig::default())
        .expect("shipped tables are consistent");
    (Arc::new(service), repository)
}

pub(super) fn router() -> axum::Router {
    let (service, _) = build_service();
    assessment_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
