use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};

use crate::appointments::domain::{Appointment, AppointmentId, AppointmentStatus};
use crate::appointments::repository::AppointmentRepository;
use crate::appointments::service::{AppointmentRequest, AppointmentService};
use crate::catalog::{Vaccine, VaccineCatalog, VaccineId};
use crate::children::{Child, ChildId, ChildStore, Gender, ParentId};
use crate::store::StoreError;

#[derive(Default)]
pub(super) struct MemoryChildStore {
    children: Mutex<HashMap<ChildId, Child>>,
}

impl MemoryChildStore {
    pub(super) fn with_child(child: Child) -> Self {
        let store = Self::default();
        store
            .children
            .lock()
            .expect("child mutex poisoned")
            .insert(child.id, child);
        store
    }
}

impl ChildStore for MemoryChildStore {
    fn get(&self, id: ChildId) -> Result<Option<Child>, StoreError> {
        let guard = self.children.lock().expect("child mutex poisoned");
        Ok(guard.get(&id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    vaccines: Mutex<Vec<Vaccine>>,
}

impl MemoryCatalog {
    pub(super) fn with_vaccines(vaccines: Vec<Vaccine>) -> Self {
        Self {
            vaccines: Mutex::new(vaccines),
        }
    }
}

impl VaccineCatalog for MemoryCatalog {
    fn list_active(&self) -> Result<Vec<Vaccine>, StoreError> {
        let guard = self.vaccines.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().filter(|v| v.active).cloned().collect())
    }

    fn get(&self, id: VaccineId) -> Result<Option<Vaccine>, StoreError> {
        let guard = self.vaccines.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|v| v.id == id).cloned())
    }
}

/// In-memory appointment store; individual updates can be poisoned to
/// exercise the sweep's failure isolation.
#[derive(Default)]
pub(super) struct MemoryAppointmentRepository {
    appointments: Mutex<HashMap<AppointmentId, Appointment>>,
    failing_updates: Mutex<HashSet<AppointmentId>>,
}

impl MemoryAppointmentRepository {
    pub(super) fn fail_update_for(&self, id: AppointmentId) {
        self.failing_updates
            .lock()
            .expect("failure mutex poisoned")
            .insert(id);
    }
}

impl AppointmentRepository for MemoryAppointmentRepository {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut guard = self.appointments.lock().expect("appointment mutex poisoned");
        if guard.contains_key(&appointment.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn update(&self, appointment: Appointment) -> Result<(), StoreError> {
        if self
            .failing_updates
            .lock()
            .expect("failure mutex poisoned")
            .contains(&appointment.id)
        {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        let mut guard = self.appointments.lock().expect("appointment mutex poisoned");
        if guard.contains_key(&appointment.id) {
            guard.insert(appointment.id, appointment);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: AppointmentId) -> Result<Option<Appointment>, StoreError> {
        let guard = self.appointments.lock().expect("appointment mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn by_child(&self, child_id: ChildId) -> Result<Vec<Appointment>, StoreError> {
        let guard = self.appointments.lock().expect("appointment mutex poisoned");
        Ok(guard
            .values()
            .filter(|appointment| appointment.child_id == child_id)
            .cloned()
            .collect())
    }

    fn by_status_and_date(
        &self,
        status: AppointmentStatus,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let guard = self.appointments.lock().expect("appointment mutex poisoned");
        let mut matches: Vec<Appointment> = guard
            .values()
            .filter(|appointment| appointment.status == status && appointment.date == date)
            .cloned()
            .collect();
        matches.sort_by_key(|appointment| appointment.id);
        Ok(matches)
    }

    fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let guard = self.appointments.lock().expect("appointment mutex poisoned");
        Ok(guard
            .values()
            .filter(|appointment| appointment.date >= start && appointment.date <= end)
            .cloned()
            .collect())
    }

    fn delete(&self, id: AppointmentId) -> Result<(), StoreError> {
        let mut guard = self.appointments.lock().expect("appointment mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn registered_child(id: u64) -> Child {
    Child {
        id: ChildId(id),
        name: "Minh".to_string(),
        birth_date: date(2025, 6, 1),
        gender: Gender::Male,
        parent_id: ParentId(3),
    }
}

pub(super) fn catalog_vaccine(id: u64, name: &str) -> Vaccine {
    Vaccine {
        id: VaccineId(id),
        name: name.to_string(),
        description: None,
        recommended_age: Some("2-4".to_string()),
        doses_required: 1,
        days_between_doses: None,
        active: true,
    }
}

pub(super) fn booking(child_id: u64, vaccine_ids: &[u64], on: NaiveDate) -> AppointmentRequest {
    AppointmentRequest {
        child_id: ChildId(child_id),
        date: on,
        time: time(9, 30),
        vaccine_ids: vaccine_ids.iter().copied().map(VaccineId).collect(),
        notes: None,
    }
}

pub(super) fn service_with(
    child: Child,
    vaccines: Vec<Vaccine>,
) -> (
    AppointmentService<MemoryChildStore, MemoryCatalog, MemoryAppointmentRepository>,
    Arc<MemoryAppointmentRepository>,
) {
    let children = Arc::new(MemoryChildStore::with_child(child));
    let catalog = Arc::new(MemoryCatalog::with_vaccines(vaccines));
    let repository = Arc::new(MemoryAppointmentRepository::default());
    let service = AppointmentService::new(children, catalog, repository.clone());
    (service, repository)
}
