//! End-to-end scenarios for the assessment service: onboarding a profile,
//! answering the questionnaire over HTTP, and scoring a CSV answer export.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use nis2_compass::assessment::{
    assessment_router, AnswerCsvImporter, AssessmentService, CategoryCatalog,
    MemoryAssessmentRepository, QuestionCatalog, ScoringConfig, ScoringEngine,
};

fn service() -> Arc<AssessmentService<MemoryAssessmentRepository>> {
    let repository = Arc::new(MemoryAssessmentRepository::default());
    Arc::new(
        AssessmentService::new(repository, ScoringConfig::default())
            .expect("shipped tables are consistent"),
    )
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn onboarding_and_assessment_round_trip() {
    let service = service();

    let response = assessment_router(service.clone())
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/organizations/acme/profile",
            json!({
                "sector": "IctServiceManagement",
                "subsector": "Managed service providers",
                "employee_count": 120,
                "annual_revenue_millions": 30.0,
                "country": "NL",
                "cross_border_services": true,
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["verdict"]["entity_type"], "Essential");
    assert_eq!(body["verdict"]["reason"], "Cross-border service provider");
    assert_eq!(
        body["verdict"]["requirements"]["incident_reporting_hours"],
        24
    );

    for (question, option) in [
        ("risk-mgmt-policies", "non-compliant"),
        ("incident-response-plan", "largely-compliant"),
        ("access-control", "fully-compliant"),
    ] {
        let response = assessment_router(service.clone())
            .oneshot(json_request(
                Method::POST,
                "/api/v1/organizations/acme/answers",
                json!({ "question_id": question, "option": option }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = assessment_router(service.clone())
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/organizations/acme/analysis")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    // (0 + 75 + 100) / 3 rounds to 58; 3 of 15 questions answered.
    assert_eq!(body["overall_score"], 58);
    assert_eq!(body["completion_rate"], 20);

    let gaps = body["critical_gaps"].as_array().expect("gaps array");
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0]["question_id"], "risk-mgmt-policies");
    assert_eq!(gaps[0]["control"], "NIS2-20.1");

    let recommendations = body["recommendations"]
        .as_array()
        .expect("recommendations array");
    assert!(!recommendations.is_empty());
    assert!(recommendations.len() <= 10);
}

#[tokio::test]
async fn reanswering_over_http_replaces_the_stored_answer() {
    let service = service();

    for option in ["non-compliant", "fully-compliant"] {
        let response = assessment_router(service.clone())
            .oneshot(json_request(
                Method::POST,
                "/api/v1/organizations/acme/answers",
                json!({ "question_id": "cryptographic-controls", "option": option }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let analysis = service
        .analysis(&nis2_compass::assessment::OrganizationId("acme".to_string()))
        .expect("analysis recomputed");
    assert_eq!(analysis.overall_score, 100);
    assert!(analysis.critical_gaps.is_empty());
}

#[test]
fn csv_export_feeds_the_scoring_engine() {
    let catalog = QuestionCatalog::nis2();
    let categories = CategoryCatalog::nis2();

    let export = "Question Id,Option,Recorded At\n\
                  risk-mgmt-policies,partially-compliant,2025-10-12 09:00:00\n\
                  risk-assessment-process,non-compliant,2025-10-12 09:05:00\n\
                  network-security,largely-compliant,2025-10-12T09:10:00Z\n\
                  retired-question,fully-compliant,2025-10-12\n";

    let import = AnswerCsvImporter::new(&catalog)
        .from_reader(export.as_bytes())
        .expect("csv parses");
    assert_eq!(import.skipped.len(), 1);

    let analysis =
        ScoringEngine::new(ScoringConfig::default()).analyze(&import.answers, &catalog, &categories);

    // (50 + 0 + 75) / 3 rounds to 42.
    assert_eq!(analysis.overall_score, 42);
    assert_eq!(analysis.completion_rate, 20);
    assert_eq!(analysis.critical_gaps.len(), 1);
    assert_eq!(analysis.orphaned_answers.len(), 0);
}
