use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ScheduleItemDraft, ScheduleItemId, ScheduleItemStatus};
use super::repository::ScheduleRepository;
use super::service::{ScheduleService, ScheduleServiceError};
use crate::catalog::VaccineCatalog;
use crate::children::{ChildId, ChildStore};
use crate::scheduling::domain::ScheduleId;

/// Router builder exposing HTTP endpoints for schedule management.
pub fn schedule_router<C, K, R>(service: Arc<ScheduleService<C, K, R>>) -> Router
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/children/:child_id/schedule",
            post(create_handler::<C, K, R>).get(get_handler::<C, K, R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id",
            put(customize_handler::<C, K, R>).delete(delete_handler::<C, K, R>),
        )
        .route(
            "/api/v1/schedule-items/:item_id/status",
            put(item_status_handler::<C, K, R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemStatusRequest {
    pub(crate) status: ScheduleItemStatus,
}

pub(crate) async fn create_handler<C, K, R>(
    State(service): State<Arc<ScheduleService<C, K, R>>>,
    Path(child_id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    let today = Local::now().date_naive();
    match service.create_standard_schedule(ChildId(child_id), today) {
        Ok(schedule) => (StatusCode::CREATED, axum::Json(schedule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<C, K, R>(
    State(service): State<Arc<ScheduleService<C, K, R>>>,
    Path(child_id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    match service.get_by_child(ChildId(child_id)) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn customize_handler<C, K, R>(
    State(service): State<Arc<ScheduleService<C, K, R>>>,
    Path(schedule_id): Path<u64>,
    axum::Json(drafts): axum::Json<Vec<ScheduleItemDraft>>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    match service.customize(ScheduleId(schedule_id), drafts) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn item_status_handler<C, K, R>(
    State(service): State<Arc<ScheduleService<C, K, R>>>,
    Path(item_id): Path<u64>,
    axum::Json(request): axum::Json<ItemStatusRequest>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    match service.update_item_status(ScheduleItemId(item_id), request.status) {
        Ok(item) => (StatusCode::OK, axum::Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<C, K, R>(
    State(service): State<Arc<ScheduleService<C, K, R>>>,
    Path(schedule_id): Path<u64>,
) -> Response
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    match service.delete(ScheduleId(schedule_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScheduleServiceError) -> Response {
    let status = match &error {
        ScheduleServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ScheduleServiceError::AlreadyExists { .. } => StatusCode::CONFLICT,
        ScheduleServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
