use super::domain::{Payment, PaymentId};
use crate::appointments::AppointmentId;
use crate::store::StoreError;

/// Storage abstraction for payments. `insert` fails with
/// [`StoreError::Conflict`] when the appointment already has a payment.
pub trait PaymentRepository: Send + Sync {
    fn insert(&self, payment: Payment) -> Result<Payment, StoreError>;
    fn update(&self, payment: Payment) -> Result<(), StoreError>;
    fn fetch(&self, id: PaymentId) -> Result<Option<Payment>, StoreError>;
    fn by_appointment(&self, appointment_id: AppointmentId)
        -> Result<Option<Payment>, StoreError>;
    fn delete(&self, id: PaymentId) -> Result<(), StoreError>;
}
