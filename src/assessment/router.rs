use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CountryCode, EvidenceDescriptor, OrganizationId, OrganizationProfile, Sector};
use super::repository::AssessmentRepository;
use super::service::{AnswerSubmission, AssessmentService, AssessmentServiceError};

/// Profile payload as submitted by the onboarding/settings client; the
/// organization id comes from the path.
#[derive(Debug, Deserialize)]
pub struct ProfileSubmission {
    pub sector: Sector,
    #[serde(default)]
    pub subsector: Option<String>,
    pub employee_count: u32,
    pub annual_revenue_millions: f64,
    pub country: String,
    #[serde(default)]
    pub population_served_percent: Option<f64>,
    #[serde(default)]
    pub cross_border_services: bool,
    #[serde(default)]
    pub critical_services_provider: bool,
}

impl ProfileSubmission {
    fn into_profile(self, organization_id: OrganizationId) -> OrganizationProfile {
        OrganizationProfile {
            organization_id,
            sector: self.sector,
            subsector: self.subsector,
            employee_count: self.employee_count,
            annual_revenue_millions: self.annual_revenue_millions,
            country: CountryCode::new(self.country),
            population_served_percent: self.population_served_percent,
            cross_border_services: self.cross_border_services,
            critical_services_provider: self.critical_services_provider,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerPayload {
    pub question_id: String,
    pub option: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceDescriptor>,
}

/// Router builder exposing the assessment API.
pub fn assessment_router<R>(service: Arc<AssessmentService<R>>) -> Router
where
    R: AssessmentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/organizations/:organization_id/profile",
            put(upsert_profile_handler::<R>),
        )
        .route(
            "/api/v1/organizations/:organization_id/classification",
            get(classification_handler::<R>),
        )
        .route(
            "/api/v1/organizations/:organization_id/answers",
            post(record_answer_handler::<R>),
        )
        .route(
            "/api/v1/organizations/:organization_id/analysis",
            get(analysis_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn upsert_profile_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(organization_id): Path<String>,
    axum::Json(submission): axum::Json<ProfileSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let profile = submission.into_profile(OrganizationId(organization_id));
    match service.upsert_profile(profile) {
        Ok(outcome) => {
            let status = if outcome.is_valid() {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            (status, axum::Json(outcome)).into_response()
        }
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn classification_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(organization_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let id = OrganizationId(organization_id);
    match service.classification(&id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(AssessmentServiceError::ProfileNotFound(_)) => {
            let payload = json!({
                "organization_id": id.0,
                "error": "no profile on record",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn record_answer_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(organization_id): Path<String>,
    axum::Json(payload): axum::Json<AnswerPayload>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let id = OrganizationId(organization_id);
    let submission = AnswerSubmission {
        question_id: super::domain::QuestionId(payload.question_id),
        option: payload.option,
        evidence: payload.evidence,
    };

    match service.record_answer(&id, submission) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(
            error @ (AssessmentServiceError::UnknownQuestion(_)
            | AssessmentServiceError::UnknownOption { .. }),
        ) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn analysis_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(organization_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let id = OrganizationId(organization_id);
    match service.analysis(&id) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => internal_error(error),
    }
}

fn internal_error(error: AssessmentServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
