use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;

use super::domain::AppointmentId;
use super::repository::AppointmentRepository;
use super::service::{AppointmentRequest, AppointmentService, AppointmentServiceError};
use crate::catalog::{VaccineCatalog, VaccineId};
use crate::children::{ChildId, ChildStore};

/// Router builder exposing HTTP endpoints for appointment booking and its
/// lifecycle transitions. The no-show transition is deliberately absent:
/// only the reconciliation sweep applies it.
pub fn appointment_router<C, K, R>(service: Arc<AppointmentService<C, K, R>>) -> Router
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/appointments",
            post(create_handler::<C, K, R>).get(by_date_range_handler::<C, K, R>),
        )
        .route("/api/v1/appointments/:id", get(get_handler::<C, K, R>))
        .route(
            "/api/v1/appointments/:id/confirm",
            post(confirm_handler::<C, K, R>),
        )
        .route(
            "/api/v1/appointments/:id/complete",
            post(complete_handler::<C, K, R>),
        )
        .route(
            "/api/v1/appointments/:id/cancel",
            post(cancel_handler::<C, K, R>),
        )
        .route(
            "/api/v1/appointments/:id/reschedule",
            post(reschedule_handler::<C, K, R>),
        )
        .route(
            "/api/v1/children/:child_id/appointments",
            get(by_child_handler::<C, K, R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAppointmentRequest {
    pub(crate) child_id: u64,
    pub(crate) date: NaiveDate,
    pub(crate) time: NaiveTime,
    pub(crate) vaccine_ids: Vec<u64>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DateRangeQuery {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelRequest {
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RescheduleRequest {
    pub(crate) date: NaiveDate,
    pub(crate) time: NaiveTime,
}

pub(crate) async fn create_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    axum::Json(request): axum::Json<CreateAppointmentRequest>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    let request = AppointmentRequest {
        child_id: ChildId(request.child_id),
        date: request.date,
        time: request.time,
        vaccine_ids: request.vaccine_ids.into_iter().map(VaccineId).collect(),
        notes: request.notes,
    };
    match service.create(request) {
        Ok(appointment) => (StatusCode::CREATED, axum::Json(appointment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Path(id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.get(AppointmentId(id)) {
        Ok(appointment) => (StatusCode::OK, axum::Json(appointment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Path(id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.confirm(AppointmentId(id)) {
        Ok(appointment) => (StatusCode::OK, axum::Json(appointment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Path(id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.complete(AppointmentId(id)) {
        Ok(appointment) => (StatusCode::OK, axum::Json(appointment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<CancelRequest>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.cancel(AppointmentId(id), request.reason) {
        Ok(appointment) => (StatusCode::OK, axum::Json(appointment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reschedule_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<RescheduleRequest>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.reschedule(AppointmentId(id), request.date, request.time) {
        Ok(appointment) => (StatusCode::OK, axum::Json(appointment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_child_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Path(child_id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.by_child(ChildId(child_id)) {
        Ok(appointments) => (StatusCode::OK, axum::Json(appointments)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_date_range_handler<C, K, R>(
    State(service): State<Arc<AppointmentService<C, K, R>>>,
    Query(range): Query<DateRangeQuery>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    match service.by_date_range(range.start, range.end) {
        Ok(appointments) => (StatusCode::OK, axum::Json(appointments)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AppointmentServiceError) -> Response {
    let status = match &error {
        AppointmentServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppointmentServiceError::InvalidState { .. } => StatusCode::CONFLICT,
        AppointmentServiceError::EmptyVaccineList => StatusCode::UNPROCESSABLE_ENTITY,
        AppointmentServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
