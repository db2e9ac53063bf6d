use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::VaccineId;
use crate::children::ChildId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AppointmentId(pub u64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentVaccineId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rescheduled,
    NoShow,
}

impl AppointmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::NoShow => "no-show",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    pub const fn can_confirm(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Rescheduled
        )
    }

    pub const fn can_cancel(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending
                | AppointmentStatus::Confirmed
                | AppointmentStatus::Rescheduled
        )
    }

    pub const fn can_reschedule(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

/// Derived from the vaccine count at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    SingleVaccine,
    MultipleVaccines,
    Package,
}

impl AppointmentType {
    pub const fn label(self) -> &'static str {
        match self {
            AppointmentType::SingleVaccine => "single vaccine",
            AppointmentType::MultipleVaccines => "multiple vaccines",
            AppointmentType::Package => "package",
        }
    }
}

/// Per-dose administration status within an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdministrationStatus {
    Pending,
    Completed,
    Skipped,
}

/// One vaccine requested at booking time, owned by its appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentVaccine {
    pub id: AppointmentVaccineId,
    pub vaccine_id: VaccineId,
    pub dose_number: u32,
    pub status: AdministrationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub child_id: ChildId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub vaccines: Vec<AppointmentVaccine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
