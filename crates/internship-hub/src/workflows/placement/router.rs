use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    ApplicationId, InternshipId, PostingDraft, RepresentativeId, RepresentativeRegistration,
    StaffId, Student, StudentId,
};
use super::filter::{RepresentativeFilter, StaffFilter, StudentFilter};
use super::outcome::Outcome;
use super::service::{PlacementError, PlacementService};
use crate::storage::PlacementStore;

type Shared<S> = State<Arc<PlacementService<S>>>;

/// Router builder exposing the placement workflow over JSON.
pub fn placement_router<S>(service: Arc<PlacementService<S>>) -> Router
where
    S: PlacementStore + 'static,
{
    Router::new()
        .route("/api/v1/login", post(login_handler::<S>))
        .route("/api/v1/students", post(register_student_handler::<S>))
        .route(
            "/api/v1/students/:student_id/applications",
            post(apply_handler::<S>).get(student_applications_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/applications/:application_id/accept",
            post(accept_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/applications/:application_id/withdraw",
            post(withdraw_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/internships/search",
            post(student_search_handler::<S>),
        )
        .route(
            "/api/v1/representatives",
            post(register_representative_handler::<S>),
        )
        .route(
            "/api/v1/representatives/:representative_id/internships",
            post(create_posting_handler::<S>),
        )
        .route(
            "/api/v1/representatives/:representative_id/internships/search",
            post(representative_search_handler::<S>),
        )
        .route(
            "/api/v1/representatives/:representative_id/internships/:internship_id",
            put(update_posting_handler::<S>).delete(delete_posting_handler::<S>),
        )
        .route(
            "/api/v1/representatives/:representative_id/internships/:internship_id/applications",
            get(internship_applications_handler::<S>),
        )
        .route(
            "/api/v1/representatives/:representative_id/internships/:internship_id/visibility",
            post(visibility_handler::<S>),
        )
        .route(
            "/api/v1/representatives/:representative_id/applications/:application_id/:decision",
            post(application_decision_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/representatives/pending",
            get(pending_representatives_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/representatives/:representative_id/:decision",
            post(representative_decision_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/internships/pending",
            get(pending_postings_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/internships/search",
            post(staff_search_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/internships/:internship_id/:decision",
            post(posting_decision_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/withdrawals",
            get(pending_withdrawals_handler::<S>),
        )
        .route(
            "/api/v1/staff/:staff_id/withdrawals/:application_id/:decision",
            post(withdrawal_decision_handler::<S>),
        )
        .with_state(service)
}

/// Final path segment of every review endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub internship_id: InternshipId,
    /// Defaults to the server's local date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

fn error_response(error: PlacementError) -> Response {
    let status = match &error {
        PlacementError::NotFound { .. } => StatusCode::NOT_FOUND,
        PlacementError::Store(_) | PlacementError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn outcome_response<T: Serialize>(
    success: StatusCode,
    result: Result<Outcome<T>, PlacementError>,
) -> Response {
    match result {
        Ok(Outcome::Applied(value)) => (success, Json(value)).into_response(),
        Ok(Outcome::Refused(refusal)) => {
            let payload = json!({
                "refused": refusal,
                "message": refusal.summary(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn listing_response<T: Serialize>(result: Result<Vec<T>, PlacementError>) -> Response {
    match result {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn login_handler<S>(
    State(service): Shared<S>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(StatusCode::OK, service.login(&request.id, &request.password))
}

pub(crate) async fn register_student_handler<S>(
    State(service): Shared<S>,
    Json(student): Json<Student>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(StatusCode::CREATED, service.register_student(student))
}

pub(crate) async fn register_representative_handler<S>(
    State(service): Shared<S>,
    Json(registration): Json<RepresentativeRegistration>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::CREATED,
        service.register_representative(registration),
    )
}

pub(crate) async fn apply_handler<S>(
    State(service): Shared<S>,
    Path(student_id): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> Response
where
    S: PlacementStore + 'static,
{
    let today = request
        .today
        .unwrap_or_else(|| Local::now().date_naive());
    outcome_response(
        StatusCode::CREATED,
        service.apply(&StudentId(student_id), &request.internship_id, today),
    )
}

pub(crate) async fn student_applications_handler<S>(
    State(service): Shared<S>,
    Path(student_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(service.student_applications(&StudentId(student_id)))
}

pub(crate) async fn accept_handler<S>(
    State(service): Shared<S>,
    Path((student_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::OK,
        service.accept_offer(&StudentId(student_id), &ApplicationId(application_id)),
    )
}

pub(crate) async fn withdraw_handler<S>(
    State(service): Shared<S>,
    Path((student_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::OK,
        service.request_withdrawal(&StudentId(student_id), &ApplicationId(application_id)),
    )
}

pub(crate) async fn student_search_handler<S>(
    State(service): Shared<S>,
    Path(student_id): Path<String>,
    Json(filter): Json<StudentFilter>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(service.student_internships(&StudentId(student_id), &filter))
}

pub(crate) async fn create_posting_handler<S>(
    State(service): Shared<S>,
    Path(representative_id): Path<String>,
    Json(draft): Json<PostingDraft>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::CREATED,
        service.create_posting(&RepresentativeId(representative_id), draft),
    )
}

pub(crate) async fn update_posting_handler<S>(
    State(service): Shared<S>,
    Path((representative_id, internship_id)): Path<(String, String)>,
    Json(draft): Json<PostingDraft>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::OK,
        service.update_posting(
            &RepresentativeId(representative_id),
            &InternshipId(internship_id),
            draft,
        ),
    )
}

pub(crate) async fn delete_posting_handler<S>(
    State(service): Shared<S>,
    Path((representative_id, internship_id)): Path<(String, String)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::OK,
        service.delete_posting(
            &RepresentativeId(representative_id),
            &InternshipId(internship_id),
        ),
    )
}

pub(crate) async fn representative_search_handler<S>(
    State(service): Shared<S>,
    Path(representative_id): Path<String>,
    Json(filter): Json<RepresentativeFilter>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(
        service.representative_internships(&RepresentativeId(representative_id), &filter),
    )
}

pub(crate) async fn internship_applications_handler<S>(
    State(service): Shared<S>,
    Path((representative_id, internship_id)): Path<(String, String)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::OK,
        service.internship_applications(
            &RepresentativeId(representative_id),
            &InternshipId(internship_id),
        ),
    )
}

pub(crate) async fn visibility_handler<S>(
    State(service): Shared<S>,
    Path((representative_id, internship_id)): Path<(String, String)>,
    Json(request): Json<VisibilityRequest>,
) -> Response
where
    S: PlacementStore + 'static,
{
    outcome_response(
        StatusCode::OK,
        service.set_visibility(
            &RepresentativeId(representative_id),
            &InternshipId(internship_id),
            request.visible,
        ),
    )
}

pub(crate) async fn application_decision_handler<S>(
    State(service): Shared<S>,
    Path((representative_id, application_id, decision)): Path<(String, String, Decision)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    let representative_id = RepresentativeId(representative_id);
    let application_id = ApplicationId(application_id);
    let result = match decision {
        Decision::Approve => service.approve_application(&representative_id, &application_id),
        Decision::Reject => service.reject_application(&representative_id, &application_id),
    };
    outcome_response(StatusCode::OK, result)
}

pub(crate) async fn pending_representatives_handler<S>(
    State(service): Shared<S>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(service.pending_representatives(&StaffId(staff_id)))
}

pub(crate) async fn representative_decision_handler<S>(
    State(service): Shared<S>,
    Path((staff_id, representative_id, decision)): Path<(String, String, Decision)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    let staff_id = StaffId(staff_id);
    let representative_id = RepresentativeId(representative_id);
    let result = match decision {
        Decision::Approve => service.approve_representative(&staff_id, &representative_id),
        Decision::Reject => service.reject_representative(&staff_id, &representative_id),
    };
    outcome_response(StatusCode::OK, result)
}

pub(crate) async fn pending_postings_handler<S>(
    State(service): Shared<S>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(service.pending_postings(&StaffId(staff_id)))
}

pub(crate) async fn staff_search_handler<S>(
    State(service): Shared<S>,
    Path(staff_id): Path<String>,
    Json(filter): Json<StaffFilter>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(service.staff_internships(&StaffId(staff_id), &filter))
}

pub(crate) async fn posting_decision_handler<S>(
    State(service): Shared<S>,
    Path((staff_id, internship_id, decision)): Path<(String, String, Decision)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    let staff_id = StaffId(staff_id);
    let internship_id = InternshipId(internship_id);
    let result = match decision {
        Decision::Approve => service.approve_posting(&staff_id, &internship_id),
        Decision::Reject => service.reject_posting(&staff_id, &internship_id),
    };
    outcome_response(StatusCode::OK, result)
}

pub(crate) async fn pending_withdrawals_handler<S>(
    State(service): Shared<S>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
{
    listing_response(service.pending_withdrawals(&StaffId(staff_id)))
}

pub(crate) async fn withdrawal_decision_handler<S>(
    State(service): Shared<S>,
    Path((staff_id, application_id, decision)): Path<(String, String, Decision)>,
) -> Response
where
    S: PlacementStore + 'static,
{
    let staff_id = StaffId(staff_id);
    let application_id = ApplicationId(application_id);
    let result = match decision {
        Decision::Approve => service.approve_withdrawal(&staff_id, &application_id),
        Decision::Reject => service.reject_withdrawal(&staff_id, &application_id),
    };
    outcome_response(StatusCode::OK, result)
}
