//! Appointment booking and its status lifecycle.
//!
//! An appointment owns its per-vaccine administration records; completing
//! the appointment is the only operation that bulk-transitions them. The
//! `NoShow` status is applied exclusively by the [`sweep`] job.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod sweep;

#[cfg(test)]
mod tests;

pub use domain::{
    AdministrationStatus, Appointment, AppointmentId, AppointmentStatus, AppointmentType,
    AppointmentVaccine, AppointmentVaccineId,
};
pub use repository::AppointmentRepository;
pub use router::appointment_router;
pub use service::{AppointmentRequest, AppointmentService, AppointmentServiceError};
pub use sweep::{ReconciliationSweep, SweepReport};
