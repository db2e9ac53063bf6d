use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{PaymentId, PaymentMethod};
use super::repository::PaymentRepository;
use super::service::{PaymentService, PaymentServiceError, PaymentUpdate};
use crate::appointments::{AppointmentId, AppointmentRepository};

/// Router builder exposing HTTP endpoints for the payment lifecycle.
pub fn payment_router<A, R>(service: Arc<PaymentService<A, R>>) -> Router
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/appointments/:appointment_id/payment",
            post(create_handler::<A, R>).get(by_appointment_handler::<A, R>),
        )
        .route(
            "/api/v1/payments/:id",
            get(get_handler::<A, R>).patch(update_handler::<A, R>),
        )
        .route(
            "/api/v1/payments/:id/confirm",
            post(confirm_handler::<A, R>),
        )
        .route("/api/v1/payments/:id/fail", post(fail_handler::<A, R>))
        .route("/api/v1/payments/:id/refund", post(refund_handler::<A, R>))
        .route(
            "/api/v1/payments/:id/refund/partial",
            post(partial_refund_handler::<A, R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePaymentRequest {
    pub(crate) amount: u32,
    pub(crate) method: PaymentMethod,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmPaymentRequest {
    pub(crate) transaction_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReasonRequest {
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PartialRefundRequest {
    pub(crate) amount: u32,
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatePaymentRequest {
    #[serde(default)]
    pub(crate) amount: Option<u32>,
    #[serde(default)]
    pub(crate) method: Option<PaymentMethod>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

pub(crate) async fn create_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(appointment_id): Path<u64>,
    axum::Json(request): axum::Json<CreatePaymentRequest>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.create(
        AppointmentId(appointment_id),
        request.amount,
        request.method,
        request.notes,
    ) {
        Ok(payment) => (StatusCode::CREATED, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_appointment_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(appointment_id): Path<u64>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.by_appointment(AppointmentId(appointment_id)) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(id): Path<u64>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.get(PaymentId(id)) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<ConfirmPaymentRequest>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.confirm(PaymentId(id), request.transaction_id) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fail_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<ReasonRequest>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.mark_failed(PaymentId(id), request.reason) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn refund_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<ReasonRequest>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.refund(PaymentId(id), request.reason) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn partial_refund_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<PartialRefundRequest>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    match service.partial_refund(PaymentId(id), request.amount, request.reason) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<A, R>(
    State(service): State<Arc<PaymentService<A, R>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<UpdatePaymentRequest>,
) -> Response
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    let fields = PaymentUpdate {
        amount: request.amount,
        method: request.method,
        notes: request.notes,
    };
    match service.update(PaymentId(id), fields) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PaymentServiceError) -> Response {
    let status = match &error {
        PaymentServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        PaymentServiceError::AlreadyExists { .. } | PaymentServiceError::InvalidState { .. } => {
            StatusCode::CONFLICT
        }
        PaymentServiceError::ZeroAmount | PaymentServiceError::RefundExceedsOriginal { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PaymentServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
