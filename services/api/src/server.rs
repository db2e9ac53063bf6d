use crate::cli::ServeArgs;
use crate::infra::{
    seeded_catalog, seeded_children, AppState, InMemoryAppointmentRepository,
    InMemoryChildRegistry, InMemoryPaymentRepository, InMemoryScheduleRepository,
    InMemoryVaccineCatalog,
};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, Local};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use vaxtrack::appointments::{AppointmentService, ReconciliationSweep};
use vaxtrack::config::AppConfig;
use vaxtrack::error::AppError;
use vaxtrack::payments::PaymentService;
use vaxtrack::scheduling::ScheduleService;
use vaxtrack::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(InMemoryChildRegistry::default());
    for child in seeded_children() {
        registry.register(child);
    }
    let catalog = Arc::new(InMemoryVaccineCatalog::with_vaccines(seeded_catalog()));
    let schedule_store = Arc::new(InMemoryScheduleRepository::default());
    let appointment_store = Arc::new(InMemoryAppointmentRepository::default());
    let payment_store = Arc::new(InMemoryPaymentRepository::default());

    let schedule_service = Arc::new(ScheduleService::new(
        registry.clone(),
        catalog.clone(),
        schedule_store,
    ));
    let appointment_service = Arc::new(AppointmentService::new(
        registry,
        catalog,
        appointment_store.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        appointment_store.clone(),
        payment_store,
    ));

    tokio::spawn(run_daily_sweep(appointment_store, config.sweep.hour));

    let app = with_api_routes(schedule_service, appointment_service, payment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "vaccination scheduling service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Fires the no-show reconciliation once per day at the configured local
/// hour. The sweep itself is idempotent, so an early wake-up is harmless.
async fn run_daily_sweep(repository: Arc<InMemoryAppointmentRepository>, hour: u32) {
    let sweep = ReconciliationSweep::new(repository);
    loop {
        let now = Local::now().naive_local();
        let next = match now.date().and_hms_opt(hour, 0, 0) {
            Some(at) if at > now => at,
            Some(at) => at + Duration::days(1),
            None => now + Duration::days(1),
        };
        let wait = (next - now)
            .to_std()
            .unwrap_or_else(|_| std::time::Duration::from_secs(60));
        tokio::time::sleep(wait).await;

        if let Err(error) = sweep.run(Local::now().date_naive()) {
            warn!(%error, "reconciliation sweep run failed");
        }
    }
}
