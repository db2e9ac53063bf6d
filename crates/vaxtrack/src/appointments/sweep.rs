use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use super::domain::{AppointmentId, AppointmentStatus};
use super::repository::AppointmentRepository;
use crate::store::StoreError;

/// Periodic job that marks stale confirmed appointments as no-shows.
///
/// This is the only code path that applies the `NoShow` transition. The
/// selection query only returns rows still `Confirmed`, so re-running a
/// sweep over the same date is a no-op for anything already reconciled.
pub struct ReconciliationSweep<R> {
    repository: Arc<R>,
}

/// Outcome of one sweep run.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub marked: Vec<AppointmentId>,
    pub failed: usize,
}

impl<R> ReconciliationSweep<R>
where
    R: AppointmentRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Transition every appointment confirmed for `today - 1 day` to
    /// `NoShow`, one store update per appointment so a crash mid-run
    /// leaves only committed transitions. A single failure is logged and
    /// skipped rather than aborting the run.
    pub fn run(&self, today: NaiveDate) -> Result<SweepReport, StoreError> {
        let stale_date = today - Duration::days(1);
        let candidates = self
            .repository
            .by_status_and_date(AppointmentStatus::Confirmed, stale_date)?;

        let mut report = SweepReport::default();
        for mut appointment in candidates {
            appointment.status = AppointmentStatus::NoShow;
            appointment.touch();
            let id = appointment.id;
            match self.repository.update(appointment) {
                Ok(()) => report.marked.push(id),
                Err(error) => {
                    warn!(appointment = %id, %error, "failed to mark no-show, continuing sweep");
                    report.failed += 1;
                }
            }
        }

        info!(
            date = %stale_date,
            marked = report.marked.len(),
            failed = report.failed,
            "reconciliation sweep finished"
        );
        Ok(report)
    }
}
