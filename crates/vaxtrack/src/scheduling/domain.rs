use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::VaccineId;
use crate::children::ChildId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ScheduleId(pub u64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ScheduleItemId(pub u64);

impl fmt::Display for ScheduleItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a schedule came to be: generated, hand-edited, or bundle-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleKind {
    Standard,
    Custom,
    Package,
}

impl ScheduleKind {
    pub const fn label(self) -> &'static str {
        match self {
            ScheduleKind::Standard => "standard",
            ScheduleKind::Custom => "custom",
            ScheduleKind::Package => "package",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleItemStatus {
    Pending,
    Scheduled,
    Completed,
    Missed,
    Skipped,
}

impl ScheduleItemStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ScheduleItemStatus::Pending => "pending",
            ScheduleItemStatus::Scheduled => "scheduled",
            ScheduleItemStatus::Completed => "completed",
            ScheduleItemStatus::Missed => "missed",
            ScheduleItemStatus::Skipped => "skipped",
        }
    }
}

/// One dose of one vaccine within a schedule. Dose numbers for a given
/// (schedule, vaccine) pair are unique and contiguous starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: ScheduleItemId,
    pub vaccine_id: VaccineId,
    pub dose_number: u32,
    pub recommended_date: NaiveDate,
    pub status: ScheduleItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Caller-supplied item for [`customize`](super::service::ScheduleService::customize);
/// the service assigns the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItemDraft {
    pub vaccine_id: VaccineId,
    pub dose_number: u32,
    pub recommended_date: NaiveDate,
    pub status: ScheduleItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A child's vaccination plan, owning its items outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationSchedule {
    pub id: ScheduleId,
    pub child_id: ChildId,
    pub kind: ScheduleKind,
    pub items: Vec<ScheduleItem>,
}

impl VaccinationSchedule {
    pub fn item(&self, item_id: ScheduleItemId) -> Option<&ScheduleItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub(crate) fn item_mut(&mut self, item_id: ScheduleItemId) -> Option<&mut ScheduleItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// Items for one vaccine, ordered by dose number.
    pub fn doses_for(&self, vaccine_id: VaccineId) -> Vec<&ScheduleItem> {
        let mut doses: Vec<&ScheduleItem> = self
            .items
            .iter()
            .filter(|item| item.vaccine_id == vaccine_id)
            .collect();
        doses.sort_by_key(|item| item.dose_number);
        doses
    }
}
