use std::sync::Arc;

use super::common::{
    booked_appointment, cash, service_with, MemoryAppointmentRepository, MemoryPaymentRepository,
};
use crate::appointments::AppointmentId;
use crate::payments::domain::{PaymentMethod, PaymentStatus};
use crate::payments::service::{PaymentService, PaymentServiceError, PaymentUpdate};
use crate::store::EntityKind;

#[test]
fn creates_pending_payment() {
    let service = service_with(booked_appointment(1));

    let payment = service
        .create(AppointmentId(1), 25_000, cash(), Some("at desk".into()))
        .expect("payment created");

    assert_eq!(payment.appointment_id, AppointmentId(1));
    assert_eq!(payment.amount, 25_000);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(payment.transaction_id.is_none());
    assert_eq!(payment.notes.as_deref(), Some("at desk"));
}

#[test]
fn rejects_zero_amount() {
    let service = service_with(booked_appointment(1));

    let error = service
        .create(AppointmentId(1), 0, cash(), None)
        .expect_err("zero amount rejected");

    assert!(matches!(error, PaymentServiceError::ZeroAmount));
}

#[test]
fn rejects_unknown_appointment() {
    let service = service_with(booked_appointment(1));

    let error = service
        .create(AppointmentId(99), 10_000, cash(), None)
        .expect_err("unknown appointment rejected");

    assert!(matches!(
        error,
        PaymentServiceError::NotFound {
            entity: EntityKind::Appointment,
            id: 99,
        }
    ));
}

#[test]
fn rejects_second_payment_for_same_appointment() {
    let service = service_with(booked_appointment(1));

    let first = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("first payment created");
    let error = service
        .create(AppointmentId(1), 20_000, PaymentMethod::CreditCard, None)
        .expect_err("second payment rejected");

    assert!(matches!(
        error,
        PaymentServiceError::AlreadyExists {
            appointment_id: AppointmentId(1),
        }
    ));

    let stored = service
        .by_appointment(AppointmentId(1))
        .expect("first payment still stored");
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.amount, 10_000);
}

#[test]
fn confirm_records_transaction_id() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, PaymentMethod::BankTransfer, None)
        .expect("payment created");

    let confirmed = service
        .confirm(payment.id, "txn-4821".into())
        .expect("payment confirmed");

    assert_eq!(confirmed.status, PaymentStatus::Completed);
    assert_eq!(confirmed.transaction_id.as_deref(), Some("txn-4821"));

    let stored = service.get(payment.id).expect("payment fetched");
    assert_eq!(stored.status, PaymentStatus::Completed);
}

#[test]
fn confirm_rejects_settled_payment() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("payment created");
    service
        .confirm(payment.id, "txn-1".into())
        .expect("payment confirmed");

    let error = service
        .confirm(payment.id, "txn-2".into())
        .expect_err("second confirm rejected");

    assert!(matches!(
        error,
        PaymentServiceError::InvalidState {
            status: "completed",
            action: "confirmed",
            ..
        }
    ));
}

#[test]
fn mark_failed_overwrites_notes() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), Some("at desk".into()))
        .expect("payment created");

    let failed = service
        .mark_failed(payment.id, "card declined".into())
        .expect("payment marked failed");

    assert_eq!(failed.status, PaymentStatus::Failed);
    assert_eq!(failed.notes.as_deref(), Some("card declined"));
}

#[test]
fn refund_requires_completed_payment() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("payment created");

    let error = service
        .refund(payment.id, "clinic closed".into())
        .expect_err("pending payment cannot be refunded");

    assert!(matches!(
        error,
        PaymentServiceError::InvalidState {
            status: "pending",
            action: "refunded",
            ..
        }
    ));
}

#[test]
fn refund_appends_to_existing_notes() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), Some("at desk".into()))
        .expect("payment created");
    service
        .confirm(payment.id, "txn-1".into())
        .expect("payment confirmed");

    let refunded = service
        .refund(payment.id, "clinic closed".into())
        .expect("payment refunded");

    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert_eq!(
        refunded.notes.as_deref(),
        Some("at desk\nrefunded 10000 in full: clinic closed")
    );
}

#[test]
fn partial_refund_cannot_exceed_original_amount() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("payment created");
    service
        .confirm(payment.id, "txn-1".into())
        .expect("payment confirmed");

    let error = service
        .partial_refund(payment.id, 10_001, "overcharged".into())
        .expect_err("excess refund rejected");

    assert!(matches!(
        error,
        PaymentServiceError::RefundExceedsOriginal {
            requested: 10_001,
            original: 10_000,
        }
    ));

    let stored = service.get(payment.id).expect("payment fetched");
    assert_eq!(stored.status, PaymentStatus::Completed);
}

#[test]
fn partial_refund_of_full_amount_is_allowed() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("payment created");
    service
        .confirm(payment.id, "txn-1".into())
        .expect("payment confirmed");

    let refunded = service
        .partial_refund(payment.id, 10_000, "duplicate charge".into())
        .expect("partial refund accepted");

    assert_eq!(refunded.status, PaymentStatus::PartiallyRefunded);
    assert_eq!(
        refunded.notes.as_deref(),
        Some("partial refund of 10000: duplicate charge")
    );
}

#[test]
fn update_edits_pending_payment() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("payment created");

    let updated = service
        .update(
            payment.id,
            PaymentUpdate {
                amount: Some(12_500),
                method: Some(PaymentMethod::EWallet),
                notes: Some("rebooked package".into()),
            },
        )
        .expect("payment updated");

    assert_eq!(updated.amount, 12_500);
    assert_eq!(updated.method, PaymentMethod::EWallet);
    assert_eq!(updated.notes.as_deref(), Some("rebooked package"));
    assert_eq!(updated.status, PaymentStatus::Pending);
}

#[test]
fn update_rejects_settled_payment() {
    let service = service_with(booked_appointment(1));
    let payment = service
        .create(AppointmentId(1), 10_000, cash(), None)
        .expect("payment created");
    service
        .confirm(payment.id, "txn-1".into())
        .expect("payment confirmed");

    let error = service
        .update(
            payment.id,
            PaymentUpdate {
                amount: Some(5_000),
                ..PaymentUpdate::default()
            },
        )
        .expect_err("settled payment is immutable");

    assert!(matches!(
        error,
        PaymentServiceError::InvalidState {
            status: "completed",
            action: "updated",
            ..
        }
    ));
}

#[test]
fn get_reports_missing_payment() {
    let service: PaymentService<MemoryAppointmentRepository, MemoryPaymentRepository> =
        PaymentService::new(
            Arc::new(MemoryAppointmentRepository::default()),
            Arc::new(MemoryPaymentRepository::default()),
        );

    let error = service
        .get(crate::payments::PaymentId(404))
        .expect_err("missing payment reported");

    assert!(matches!(
        error,
        PaymentServiceError::NotFound {
            entity: EntityKind::Payment,
            id: 404,
        }
    ));
}
