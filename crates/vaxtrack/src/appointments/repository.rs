use chrono::NaiveDate;

use super::domain::{Appointment, AppointmentId, AppointmentStatus};
use crate::children::ChildId;
use crate::store::StoreError;

/// Storage abstraction for appointments. `insert` and `update` receive the
/// whole aggregate (appointment plus its vaccine records) and apply it
/// atomically.
pub trait AppointmentRepository: Send + Sync {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError>;
    fn update(&self, appointment: Appointment) -> Result<(), StoreError>;
    fn fetch(&self, id: AppointmentId) -> Result<Option<Appointment>, StoreError>;
    fn by_child(&self, child_id: ChildId) -> Result<Vec<Appointment>, StoreError>;
    /// Used by the reconciliation sweep to select stale confirmed rows.
    fn by_status_and_date(
        &self,
        status: AppointmentStatus,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
    fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
    fn delete(&self, id: AppointmentId) -> Result<(), StoreError>;
}
