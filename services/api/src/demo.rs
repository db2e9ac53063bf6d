use crate::infra::{
    parse_date, seeded_catalog, seeded_children, InMemoryAppointmentRepository,
    InMemoryChildRegistry, InMemoryPaymentRepository, InMemoryScheduleRepository,
    InMemoryVaccineCatalog,
};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use std::sync::Arc;
use vaxtrack::appointments::{
    AppointmentRequest, AppointmentService, ReconciliationSweep,
};
use vaxtrack::children::ChildId;
use vaxtrack::error::AppError;
use vaxtrack::payments::{PaymentMethod, PaymentService};
use vaxtrack::scheduling::ScheduleService;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SweepArgs {
    /// Run the sweep as if it were this date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

struct DemoClinic {
    schedules: ScheduleService<InMemoryChildRegistry, InMemoryVaccineCatalog, InMemoryScheduleRepository>,
    appointments: AppointmentService<
        InMemoryChildRegistry,
        InMemoryVaccineCatalog,
        InMemoryAppointmentRepository,
    >,
    payments: PaymentService<InMemoryAppointmentRepository, InMemoryPaymentRepository>,
    appointment_store: Arc<InMemoryAppointmentRepository>,
}

fn build_demo_clinic() -> DemoClinic {
    let registry = Arc::new(InMemoryChildRegistry::default());
    for child in seeded_children() {
        registry.register(child);
    }
    let catalog = Arc::new(InMemoryVaccineCatalog::with_vaccines(seeded_catalog()));
    let schedule_store = Arc::new(InMemoryScheduleRepository::default());
    let appointment_store = Arc::new(InMemoryAppointmentRepository::default());
    let payment_store = Arc::new(InMemoryPaymentRepository::default());

    DemoClinic {
        schedules: ScheduleService::new(registry.clone(), catalog.clone(), schedule_store),
        appointments: AppointmentService::new(registry, catalog, appointment_store.clone()),
        payments: PaymentService::new(appointment_store.clone(), payment_store),
        appointment_store,
    }
}

fn demo_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// Walk one child through schedule generation, booking, payment, and
/// completion, printing each step.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let clinic = build_demo_clinic();
    let child_id = ChildId(1);

    println!("== Vaccination schedule ==");
    let schedule = clinic.schedules.create_standard_schedule(child_id, today)?;
    println!(
        "generated {} schedule with {} doses for child {}",
        schedule.kind.label(),
        schedule.items.len(),
        schedule.child_id,
    );
    for item in &schedule.items {
        println!(
            "  vaccine {:>2}  dose {}  due {}  [{}]",
            item.vaccine_id, item.dose_number, item.recommended_date, item.status.label(),
        );
    }

    let first = schedule
        .items
        .first()
        .ok_or_else(|| AppError::Workflow("schedule generation produced no doses".into()))?;

    println!("\n== Appointment lifecycle ==");
    let appointment = clinic.appointments.create(AppointmentRequest {
        child_id,
        date: first.recommended_date,
        time: demo_time(),
        vaccine_ids: vec![first.vaccine_id],
        notes: None,
    })?;
    println!(
        "booked appointment {} on {} [{}]",
        appointment.id,
        appointment.date,
        appointment.status.label(),
    );

    let appointment = clinic.appointments.confirm(appointment.id)?;
    println!("confirmed appointment {}", appointment.id);

    println!("\n== Payment ==");
    let payment = clinic
        .payments
        .create(appointment.id, 15_000, PaymentMethod::Cash, None)?;
    println!(
        "opened payment {} for {} minor units [{}]",
        payment.id,
        payment.amount,
        payment.status.label(),
    );
    let payment = clinic.payments.confirm(payment.id, "txn-demo-1".to_string())?;
    println!("settled payment {} [{}]", payment.id, payment.status.label());

    let appointment = clinic.appointments.complete(appointment.id)?;
    println!(
        "\ncompleted appointment {} [{}], {} dose(s) administered",
        appointment.id,
        appointment.status.label(),
        appointment.vaccines.len(),
    );

    Ok(())
}

/// Seed a clinic with one attended and one unattended visit from yesterday,
/// then run the reconciliation sweep and report what it marked.
pub(crate) fn run_sweep(args: SweepArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let yesterday = today - Duration::days(1);
    let clinic = build_demo_clinic();

    let attended = clinic.appointments.create(AppointmentRequest {
        child_id: ChildId(1),
        date: yesterday,
        time: demo_time(),
        vaccine_ids: vec![vaxtrack::catalog::VaccineId(1)],
        notes: None,
    })?;
    clinic.appointments.confirm(attended.id)?;
    clinic.appointments.complete(attended.id)?;

    let missed = clinic.appointments.create(AppointmentRequest {
        child_id: ChildId(2),
        date: yesterday,
        time: demo_time(),
        vaccine_ids: vec![vaxtrack::catalog::VaccineId(2)],
        notes: None,
    })?;
    clinic.appointments.confirm(missed.id)?;

    let sweep = ReconciliationSweep::new(clinic.appointment_store.clone());
    let report = sweep.run(today)?;

    println!(
        "sweep over {} marked {} appointment(s) as no-shows ({} failure(s))",
        yesterday,
        report.marked.len(),
        report.failed,
    );
    for id in &report.marked {
        println!("  appointment {id} -> no-show");
    }

    Ok(())
}
