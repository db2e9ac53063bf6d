use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime, Utc};

use crate::appointments::domain::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentType,
};
use crate::appointments::repository::AppointmentRepository;
use crate::catalog::VaccineId;
use crate::children::ChildId;
use crate::payments::domain::{Payment, PaymentId, PaymentMethod};
use crate::payments::repository::PaymentRepository;
use crate::payments::service::PaymentService;
use crate::store::StoreError;

#[derive(Default)]
pub(super) struct MemoryAppointmentRepository {
    appointments: Mutex<HashMap<AppointmentId, Appointment>>,
}

impl MemoryAppointmentRepository {
    pub(super) fn with_appointment(appointment: Appointment) -> Self {
        let store = Self::default();
        store
            .appointments
            .lock()
            .expect("appointment mutex poisoned")
            .insert(appointment.id, appointment);
        store
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

#[derive(Default)]
pub(super) struct MemoryPaymentRepository {
    payments: Mutex<HashMap<PaymentId, Payment>>,
}

impl PaymentRepository for MemoryPaymentRepository {
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

pub(super) fn booked_appointment(id: u64) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: AppointmentId(id),
        child_id: ChildId(1),
        date: NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
        time: NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
        appointment_type: AppointmentType::SingleVaccine,
        status: AppointmentStatus::Confirmed,
        notes: None,
        vaccines: vec![crate::appointments::domain::AppointmentVaccine {
            id: crate::appointments::domain::AppointmentVaccineId(1),
            vaccine_id: VaccineId(10),
            dose_number: 1,
            status: crate::appointments::domain::AdministrationStatus::Pending,
        }],
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn cash() -> PaymentMethod {
    PaymentMethod::Cash
}

pub(super) fn service_with(
    appointment: Appointment,
) -> PaymentService<MemoryAppointmentRepository, MemoryPaymentRepository> {
    let appointments = Arc::new(MemoryAppointmentRepository::with_appointment(appointment));
    let repository = Arc::new(MemoryPaymentRepository::default());
    PaymentService::new(appointments, repository)
}
