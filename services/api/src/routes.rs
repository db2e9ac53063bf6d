use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use vaxtrack::appointments::{appointment_router, AppointmentRepository, AppointmentService};
use vaxtrack::catalog::VaccineCatalog;
use vaxtrack::children::ChildStore;
use vaxtrack::payments::{payment_router, PaymentRepository, PaymentService};
use vaxtrack::scheduling::{schedule_router, ScheduleRepository, ScheduleService};

pub(crate) fn with_api_routes<C, K, SR, AR, PR>(
    schedules: Arc<ScheduleService<C, K, SR>>,
    appointments: Arc<AppointmentService<C, K, AR>>,
    payments: Arc<PaymentService<AR, PR>>,
) -> axum::Router
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    SR: ScheduleRepository + 'static,
    AR: AppointmentRepository + 'static,
    PR: PaymentRepository + 'static,
{
    schedule_router(schedules)
        .merge(appointment_router(appointments))
        .merge(payment_router(payments))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
