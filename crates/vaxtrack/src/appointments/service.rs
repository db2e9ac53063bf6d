use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};

use super::domain::{
    AdministrationStatus, Appointment, AppointmentId, AppointmentStatus, AppointmentType,
    AppointmentVaccine, AppointmentVaccineId,
};
use super::repository::AppointmentRepository;
use crate::catalog::{VaccineCatalog, VaccineId};
use crate::children::{ChildId, ChildStore};
use crate::store::{EntityKind, StoreError};

/// Booking request for [`AppointmentService::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRequest {
    pub child_id: ChildId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub vaccine_ids: Vec<VaccineId>,
    pub notes: Option<String>,
}

/// Service governing the appointment state machine.
pub struct AppointmentService<C, K, R> {
    children: Arc<C>,
    catalog: Arc<K>,
    repository: Arc<R>,
}

static APPOINTMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPOINTMENT_VACCINE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_appointment_id() -> AppointmentId {
    AppointmentId(APPOINTMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_appointment_vaccine_id() -> AppointmentVaccineId {
    AppointmentVaccineId(APPOINTMENT_VACCINE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<C, K, R> AppointmentService<C, K, R>
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: AppointmentRepository + 'static,
{
    pub fn new(children: Arc<C>, catalog: Arc<K>, repository: Arc<R>) -> Self {
        Self {
            children,
            catalog,
            repository,
        }
    }

    /// Book a new appointment in `Pending` with one administration record
    /// per requested vaccine.
    ///
    /// Dose numbers default to 1; the booking does not consult the child's
    /// schedule for the next due dose.
    pub fn create(
        &self,
        request: AppointmentRequest,
    ) -> Result<Appointment, AppointmentServiceError> {
        if request.vaccine_ids.is_empty() {
            return Err(AppointmentServiceError::EmptyVaccineList);
        }

        self.children
            .get(request.child_id)?
            .ok_or(AppointmentServiceError::NotFound {
                entity: EntityKind::Child,
                id: request.child_id.0,
            })?;

        let mut vaccines = Vec::with_capacity(request.vaccine_ids.len());
        for vaccine_id in &request.vaccine_ids {
            self.catalog
                .get(*vaccine_id)?
                .ok_or(AppointmentServiceError::NotFound {
                    entity: EntityKind::Vaccine,
                    id: vaccine_id.0,
                })?;
            vaccines.push(AppointmentVaccine {
                id: next_appointment_vaccine_id(),
                vaccine_id: *vaccine_id,
                dose_number: 1,
                status: AdministrationStatus::Pending,
            });
        }

        let appointment_type = if request.vaccine_ids.len() == 1 {
            AppointmentType::SingleVaccine
        } else {
            AppointmentType::MultipleVaccines
        };

        let now = Utc::now();
        let appointment = Appointment {
            id: next_appointment_id(),
            child_id: request.child_id,
            date: request.date,
            time: request.time,
            appointment_type,
            status: AppointmentStatus::Pending,
            notes: request.notes,
            vaccines,
            created_at: now,
            updated_at: now,
        };

        Ok(self.repository.insert(appointment)?)
    }

    pub fn confirm(&self, id: AppointmentId) -> Result<Appointment, AppointmentServiceError> {
        let mut appointment = self.fetch(id)?;
        if !appointment.status.can_confirm() {
            return Err(invalid_state(&appointment, "confirmed"));
        }
        appointment.status = AppointmentStatus::Confirmed;
        appointment.touch();
        self.repository.update(appointment.clone())?;
        Ok(appointment)
    }

    /// Complete a confirmed appointment, marking every owned
    /// administration record `Completed` in the same aggregate update.
    pub fn complete(&self, id: AppointmentId) -> Result<Appointment, AppointmentServiceError> {
        let mut appointment = self.fetch(id)?;
        if appointment.status != AppointmentStatus::Confirmed {
            return Err(invalid_state(&appointment, "completed"));
        }
        appointment.status = AppointmentStatus::Completed;
        for record in &mut appointment.vaccines {
            record.status = AdministrationStatus::Completed;
        }
        appointment.touch();
        self.repository.update(appointment.clone())?;
        Ok(appointment)
    }

    pub fn cancel(
        &self,
        id: AppointmentId,
        reason: String,
    ) -> Result<Appointment, AppointmentServiceError> {
        let mut appointment = self.fetch(id)?;
        if !appointment.status.can_cancel() {
            return Err(invalid_state(&appointment, "cancelled"));
        }
        appointment.status = AppointmentStatus::Cancelled;
        appointment.notes = Some(reason);
        appointment.touch();
        self.repository.update(appointment.clone())?;
        Ok(appointment)
    }

    /// Move the appointment to a new slot; it must be re-confirmed before
    /// it can complete.
    pub fn reschedule(
        &self,
        id: AppointmentId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Appointment, AppointmentServiceError> {
        let mut appointment = self.fetch(id)?;
        if !appointment.status.can_reschedule() {
            return Err(invalid_state(&appointment, "rescheduled"));
        }
        appointment.status = AppointmentStatus::Rescheduled;
        appointment.date = date;
        appointment.time = time;
        appointment.touch();
        self.repository.update(appointment.clone())?;
        Ok(appointment)
    }

    pub fn get(&self, id: AppointmentId) -> Result<Appointment, AppointmentServiceError> {
        self.fetch(id)
    }

    pub fn by_child(
        &self,
        child_id: ChildId,
    ) -> Result<Vec<Appointment>, AppointmentServiceError> {
        Ok(self.repository.by_child(child_id)?)
    }

    pub fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentServiceError> {
        Ok(self.repository.by_date_range(start, end)?)
    }

    pub fn by_status(
        &self,
        status: AppointmentStatus,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentServiceError> {
        Ok(self.repository.by_status_and_date(status, date)?)
    }

    fn fetch(&self, id: AppointmentId) -> Result<Appointment, AppointmentServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(AppointmentServiceError::NotFound {
                entity: EntityKind::Appointment,
                id: id.0,
            })
    }
}

fn invalid_state(appointment: &Appointment, action: &'static str) -> AppointmentServiceError {
    AppointmentServiceError::InvalidState {
        id: appointment.id,
        status: appointment.status.label(),
        action,
    }
}

/// Error raised by the appointment service.
#[derive(Debug, thiserror::Error)]
pub enum AppointmentServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },
    #[error("appointment {id} cannot be {action} while {status}")]
    InvalidState {
        id: AppointmentId,
        status: &'static str,
        action: &'static str,
    },
    #[error("appointment requires at least one vaccine")]
    EmptyVaccineList,
    #[error(transparent)]
    Store(#[from] StoreError),
}
