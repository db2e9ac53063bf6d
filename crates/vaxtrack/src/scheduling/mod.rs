//! Vaccination schedule generation and maintenance.
//!
//! A child has at most one [`VaccinationSchedule`]; the generator builds a
//! standard one from the active catalog and the child's birth date, and the
//! service supports replacing it wholesale with a custom plan.

pub mod domain;
pub(crate) mod generator;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ScheduleId, ScheduleItem, ScheduleItemDraft, ScheduleItemId, ScheduleItemStatus, ScheduleKind,
    VaccinationSchedule,
};
pub use repository::ScheduleRepository;
pub use router::schedule_router;
pub use service::{ScheduleService, ScheduleServiceError};
