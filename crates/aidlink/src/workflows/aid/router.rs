use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::audit::AuditSink;
use super::domain::{AccountDetails, ApplicationId};
use super::repository::{ApplicationStore, CitizenDirectory, DisbursementGateway};
use super::risk::ApplicantHistory;
use super::service::{AidService, AidServiceError};

/// Router builder exposing the citizen flow and the admin surface.
pub fn aid_router<S, L, G>(service: Arc<AidService<S, L, G>>) -> Router
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    Router::new()
        .route("/api/v1/citizen/verify", post(verify_handler::<S, L, G>))
        .route("/api/v1/citizen/submit", post(submit_handler::<S, L, G>))
        .route(
            "/api/v1/admin/applications",
            get(list_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/applications/:application_id",
            get(get_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/approve",
            patch(approve_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/reject",
            patch(reject_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/applications/bulk-approve",
            post(bulk_approve_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/applications/bulk-reject",
            post(bulk_reject_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/simulate-eligibility",
            post(simulate_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/activity-feed",
            get(activity_feed_handler::<S, L, G>),
        )
        .route(
            "/api/v1/admin/dashboard/stats",
            get(dashboard_handler::<S, L, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyRequest {
    pub(crate) mykad_number: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub(crate) session_token: String,
    pub(crate) program_name: String,
    #[serde(default)]
    pub(crate) account_details: Option<AccountDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default = "default_reviewer")]
    pub(crate) reviewer: String,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

fn default_reviewer() -> String {
    "admin".to_string()
}

impl Default for ReviewRequest {
    fn default() -> Self {
        Self {
            reviewer: default_reviewer(),
            reason: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkRequest {
    pub(crate) application_ids: Vec<String>,
    #[serde(default = "default_reviewer")]
    pub(crate) reviewer: String,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimulateRequest {
    pub(crate) household_income: u32,
    #[serde(default)]
    pub(crate) household_size: Option<u32>,
    pub(crate) program_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedQuery {
    #[serde(default = "default_feed_limit")]
    pub(crate) limit: usize,
}

fn default_feed_limit() -> usize {
    50
}

fn error_response(err: AidServiceError) -> Response {
    let status = match err {
        AidServiceError::CitizenNotFound | AidServiceError::ApplicationNotFound => {
            StatusCode::NOT_FOUND
        }
        AidServiceError::InvalidSessionToken => StatusCode::UNAUTHORIZED,
        AidServiceError::AlreadyDisbursed => StatusCode::BAD_REQUEST,
        AidServiceError::Store(_) | AidServiceError::Audit(_) | AidServiceError::Transfer(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn verify_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    axum::Json(request): axum::Json<VerifyRequest>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    match service.verify_eligibility(&request.mykad_number) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    let account = request.account_details.unwrap_or_default();
    match service.submit_application(&request.session_token, &request.program_name, account) {
        Ok(record) => {
            let payload = json!({
                "application_id": record.id.0,
                "status": record.status.label(),
                "amount": record.amount,
                "secret_code": record.secret_code,
                "program_name": record.program_name,
                "created_at": record.created_at,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    match service.list() {
        Ok(records) => {
            let payload = json!({ "count": records.len(), "applications": records });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    Path(application_id): Path<String>,
    request: Option<axum::Json<ReviewRequest>>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    let review = request.map(|json| json.0).unwrap_or_default();
    match service.approve(&ApplicationId(application_id), &review.reviewer) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    Path(application_id): Path<String>,
    request: Option<axum::Json<ReviewRequest>>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    let review = request.map(|json| json.0).unwrap_or_default();
    match service.reject(
        &ApplicationId(application_id),
        &review.reviewer,
        review.reason.as_deref(),
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_approve_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    axum::Json(request): axum::Json<BulkRequest>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    let ids: Vec<ApplicationId> = request.application_ids.into_iter().map(ApplicationId).collect();
    let outcome = service.bulk_approve(&ids, &request.reviewer);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn bulk_reject_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    axum::Json(request): axum::Json<BulkRequest>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    let ids: Vec<ApplicationId> = request.application_ids.into_iter().map(ApplicationId).collect();
    let outcome = service.bulk_reject(&ids, &request.reviewer, request.reason.as_deref());
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn simulate_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    axum::Json(request): axum::Json<SimulateRequest>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    let result = service.simulate(
        request.household_income,
        request.household_size,
        &request.program_name,
    );
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn activity_feed_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
    Query(query): Query<FeedQuery>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    match service.activity_feed(query.limit) {
        Ok(entries) => {
            let payload = json!({ "count": entries.len(), "entries": entries });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler<S, L, G>(
    State(service): State<Arc<AidService<S, L, G>>>,
) -> Response
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    match service.dashboard_summary() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}
