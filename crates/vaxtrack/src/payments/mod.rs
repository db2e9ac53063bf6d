//! Payment lifecycle for appointments.
//!
//! A payment is optional and bound 1:1 to its appointment; once settled
//! (completed or refunded in any form) it is immutable to routine updates.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Payment, PaymentId, PaymentMethod, PaymentStatus};
pub use repository::PaymentRepository;
pub use router::payment_router;
pub use service::{PaymentService, PaymentServiceError, PaymentUpdate};
