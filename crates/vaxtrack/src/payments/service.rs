use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{Payment, PaymentId, PaymentMethod, PaymentStatus};
use super::repository::PaymentRepository;
use crate::appointments::{AppointmentId, AppointmentRepository};
use crate::store::{EntityKind, StoreError};

/// Partial update applied to a payment that has not settled yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentUpdate {
    pub amount: Option<u32>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Service governing the payment state machine.
pub struct PaymentService<A, R> {
    appointments: Arc<A>,
    repository: Arc<R>,
}

static PAYMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_payment_id() -> PaymentId {
    PaymentId(PAYMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<A, R> PaymentService<A, R>
where
    A: AppointmentRepository + 'static,
    R: PaymentRepository + 'static,
{
    pub fn new(appointments: Arc<A>, repository: Arc<R>) -> Self {
        Self {
            appointments,
            repository,
        }
    }

    /// Open a pending payment against an appointment; at most one payment
    /// may ever exist per appointment.
    pub fn create(
        &self,
        appointment_id: AppointmentId,
        amount: u32,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Payment, PaymentServiceError> {
        if amount == 0 {
            return Err(PaymentServiceError::ZeroAmount);
        }

        self.appointments
            .fetch(appointment_id)?
            .ok_or(PaymentServiceError::NotFound {
                entity: EntityKind::Appointment,
                id: appointment_id.0,
            })?;

        if self.repository.by_appointment(appointment_id)?.is_some() {
            return Err(PaymentServiceError::AlreadyExists { appointment_id });
        }

        let now = Utc::now();
        let payment = Payment {
            id: next_payment_id(),
            appointment_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            transaction_id: None,
            notes,
            created_at: now,
            updated_at: now,
        };

        match self.repository.insert(payment) {
            Ok(stored) => Ok(stored),
            Err(StoreError::Conflict) => Err(PaymentServiceError::AlreadyExists { appointment_id }),
            Err(other) => Err(other.into()),
        }
    }

    pub fn confirm(
        &self,
        id: PaymentId,
        transaction_id: String,
    ) -> Result<Payment, PaymentServiceError> {
        let mut payment = self.fetch(id)?;
        if payment.status != PaymentStatus::Pending {
            return Err(invalid_state(&payment, "confirmed"));
        }
        payment.status = PaymentStatus::Completed;
        payment.transaction_id = Some(transaction_id);
        payment.touch();
        self.repository.update(payment.clone())?;
        Ok(payment)
    }

    pub fn mark_failed(
        &self,
        id: PaymentId,
        reason: String,
    ) -> Result<Payment, PaymentServiceError> {
        let mut payment = self.fetch(id)?;
        if payment.status != PaymentStatus::Pending {
            return Err(invalid_state(&payment, "marked failed"));
        }
        payment.status = PaymentStatus::Failed;
        payment.notes = Some(reason);
        payment.touch();
        self.repository.update(payment.clone())?;
        Ok(payment)
    }

    /// Refund a completed payment in full.
    pub fn refund(&self, id: PaymentId, reason: String) -> Result<Payment, PaymentServiceError> {
        let mut payment = self.fetch(id)?;
        if payment.status != PaymentStatus::Completed {
            return Err(invalid_state(&payment, "refunded"));
        }
        payment.status = PaymentStatus::Refunded;
        let line = format!("refunded {} in full: {reason}", payment.amount);
        payment.append_note(line);
        payment.touch();
        self.repository.update(payment.clone())?;
        Ok(payment)
    }

    /// Refund part of a completed payment; the refunded amount may not
    /// exceed what was originally paid.
    pub fn partial_refund(
        &self,
        id: PaymentId,
        amount: u32,
        reason: String,
    ) -> Result<Payment, PaymentServiceError> {
        let mut payment = self.fetch(id)?;
        if payment.status != PaymentStatus::Completed {
            return Err(invalid_state(&payment, "refunded"));
        }
        if amount == 0 {
            return Err(PaymentServiceError::ZeroAmount);
        }
        if amount > payment.amount {
            return Err(PaymentServiceError::RefundExceedsOriginal {
                requested: amount,
                original: payment.amount,
            });
        }
        payment.status = PaymentStatus::PartiallyRefunded;
        payment.append_note(format!("partial refund of {amount}: {reason}"));
        payment.touch();
        self.repository.update(payment.clone())?;
        Ok(payment)
    }

    /// Edit a payment that has not settled; completed or refunded payments
    /// are immutable.
    pub fn update(
        &self,
        id: PaymentId,
        fields: PaymentUpdate,
    ) -> Result<Payment, PaymentServiceError> {
        let mut payment = self.fetch(id)?;
        if payment.status.is_settled() {
            return Err(invalid_state(&payment, "updated"));
        }
        if let Some(amount) = fields.amount {
            if amount == 0 {
                return Err(PaymentServiceError::ZeroAmount);
            }
            payment.amount = amount;
        }
        if let Some(method) = fields.method {
            payment.method = method;
        }
        if let Some(notes) = fields.notes {
            payment.notes = Some(notes);
        }
        payment.touch();
        self.repository.update(payment.clone())?;
        Ok(payment)
    }

    pub fn get(&self, id: PaymentId) -> Result<Payment, PaymentServiceError> {
        self.fetch(id)
    }

    pub fn by_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Payment, PaymentServiceError> {
        self.repository
            .by_appointment(appointment_id)?
            .ok_or(PaymentServiceError::NotFound {
                entity: EntityKind::Payment,
                id: appointment_id.0,
            })
    }

    fn fetch(&self, id: PaymentId) -> Result<Payment, PaymentServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(PaymentServiceError::NotFound {
                entity: EntityKind::Payment,
                id: id.0,
            })
    }
}

fn invalid_state(payment: &Payment, action: &'static str) -> PaymentServiceError {
    PaymentServiceError::InvalidState {
        id: payment.id,
        status: payment.status.label(),
        action,
    }
}

/// Error raised by the payment service.
#[derive(Debug, thiserror::Error)]
pub enum PaymentServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },
    #[error("payment already exists for appointment {appointment_id}")]
    AlreadyExists { appointment_id: AppointmentId },
    #[error("payment {id} cannot be {action} while {status}")]
    InvalidState {
        id: PaymentId,
        status: &'static str,
        action: &'static str,
    },
    #[error("payment amount must be positive")]
    ZeroAmount,
    #[error("refund of {requested} exceeds the original amount {original}")]
    RefundExceedsOriginal { requested: u32, original: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}
