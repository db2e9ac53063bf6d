use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use vaxtrack::appointments::{Appointment, AppointmentId, AppointmentRepository, AppointmentStatus};
use vaxtrack::catalog::{Vaccine, VaccineCatalog, VaccineId};
use vaxtrack::children::{Child, ChildId, ChildStore, Gender, ParentId};
use vaxtrack::payments::{Payment, PaymentId, PaymentRepository};
use vaxtrack::scheduling::{ScheduleId, ScheduleItemId, ScheduleRepository, VaccinationSchedule};
use vaxtrack::store::StoreError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryChildRegistry {
    children: Arc<Mutex<HashMap<ChildId, Child>>>,
}

impl InMemoryChildRegistry {
    pub(crate) fn register(&self, child: Child) {
        let mut guard = self.children.lock().expect("registry mutex poisoned");
        guard.insert(child.id, child);
    }
}

impl ChildStore for InMemoryChildRegistry {
    fn get(&self, id: ChildId) -> Result<Option<Child>, StoreError> {
        let guard = self.children.lock().expect("registry mutex poisoned");
        Ok(guard.get(&id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryVaccineCatalog {
    vaccines: Arc<Mutex<Vec<Vaccine>>>,
}

impl InMemoryVaccineCatalog {
    pub(crate) fn with_vaccines(vaccines: Vec<Vaccine>) -> Self {
        Self {
            vaccines: Arc::new(Mutex::new(vaccines)),
        }
    }
}

impl VaccineCatalog for InMemoryVaccineCatalog {
    fn list_active(&self) -> Result<Vec<Vaccine>, StoreError> {
        let guard = self.vaccines.lock().expect("catalog mutex poisoned");
        Ok(guard
            .iter()
            .filter(|vaccine| vaccine.active)
            .cloned()
            .collect())
    }

    fn get(&self, id: VaccineId) -> Result<Option<Vaccine>, StoreError> {
        let guard = self.vaccines.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|vaccine| vaccine.id == id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryScheduleRepository {
    schedules: Arc<Mutex<HashMap<ScheduleId, VaccinationSchedule>>>,
}

impl ScheduleRepository for InMemoryScheduleRepository {
    fn insert(&self, schedule: VaccinationSchedule) -> Result<VaccinationSchedule, StoreError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.child_id == schedule.child_id)
        {
            return Err(StoreError::Conflict);
        }
        guard.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    fn update(&self, schedule: VaccinationSchedule) -> Result<(), StoreError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        if guard.contains_key(&schedule.id) {
            guard.insert(schedule.id, schedule);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: ScheduleId) -> Result<Option<VaccinationSchedule>, StoreError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn fetch_by_child(&self, child_id: ChildId) -> Result<Option<VaccinationSchedule>, StoreError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard
            .values()
            .find(|schedule| schedule.child_id == child_id)
            .cloned())
    }

    fn fetch_containing_item(
        &self,
        item_id: ScheduleItemId,
    ) -> Result<Option<VaccinationSchedule>, StoreError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard
            .values()
            .find(|schedule| schedule.item(item_id).is_some())
            .cloned())
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAppointmentRepository {
    appointments: Arc<Mutex<HashMap<AppointmentId, Appointment>>>,
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut guard = self.appointments.lock().expect("appointment mutex poisoned");
        if guard.contains_key(&appointment.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn update(&self, appointment: Appointment) -> Result<(), StoreError> {
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
        Ok(guard
            .values()
            .filter(|appointment| appointment.status == status && appointment.date == date)
            .cloned()
            .collect())
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentRepository {
    payments: Arc<Mutex<HashMap<PaymentId, Payment>>>,
}

impl PaymentRepository for InMemoryPaymentRepository {
    fn insert(&self, payment: Payment) -> Result<Payment, StoreError> {
        let mut guard = self.payments.lock().expect("payment mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.appointment_id == payment.appointment_id)
        {
            return Err(StoreError::Conflict);
        }
        guard.insert(payment.id, payment.clone());
        Ok(payment)
    }

    fn update(&self, payment: Payment) -> Result<(), StoreError> {
        let mut guard = self.payments.lock().expect("payment mutex poisoned");
        if guard.contains_key(&payment.id) {
            guard.insert(payment.id, payment);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: PaymentId) -> Result<Option<Payment>, StoreError> {
        let guard = self.payments.lock().expect("payment mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn by_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Option<Payment>, StoreError> {
        let guard = self.payments.lock().expect("payment mutex poisoned");
        Ok(guard
            .values()
            .find(|payment| payment.appointment_id == appointment_id)
            .cloned())
    }

    fn delete(&self, id: PaymentId) -> Result<(), StoreError> {
        let mut guard = self.payments.lock().expect("payment mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

fn vaccine(
    id: u64,
    name: &str,
    window: &str,
    doses: u32,
    interval: Option<i64>,
) -> Vaccine {
    Vaccine {
        id: VaccineId(id),
        name: name.to_string(),
        description: None,
        recommended_age: Some(window.to_string()),
        doses_required: doses,
        days_between_doses: interval,
        active: true,
    }
}

/// Catalog slice used until the service is backed by a real database.
pub(crate) fn seeded_catalog() -> Vec<Vaccine> {
    vec![
        vaccine(1, "Hepatitis B", "0-1", 1, None),
        vaccine(2, "BCG", "0-1", 1, None),
        vaccine(3, "Pentavalent", "2-4", 3, Some(30)),
        vaccine(4, "Oral Polio", "2-4", 3, Some(28)),
        vaccine(5, "Pneumococcal", "2-4", 3, Some(30)),
        vaccine(6, "Measles-Rubella", "9-12", 2, Some(180)),
        vaccine(7, "Varicella", "12-18 months", 1, None),
    ]
}

pub(crate) fn seeded_children() -> Vec<Child> {
    vec![
        Child {
            id: ChildId(1),
            name: "Amara Osei".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2026, 2, 15).expect("valid date"),
            gender: Gender::Female,
            parent_id: ParentId(1),
        },
        Child {
            id: ChildId(2),
            name: "Luis Fernandez".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date"),
            gender: Gender::Male,
            parent_id: ParentId(2),
        },
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
