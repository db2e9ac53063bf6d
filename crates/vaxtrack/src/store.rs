use std::fmt;

use serde::Serialize;

/// Entity kinds carried by not-found style errors so callers can build a
/// precise message without reaching into the failing module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Child,
    Vaccine,
    Schedule,
    ScheduleItem,
    Appointment,
    Payment,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Child => "child",
            EntityKind::Vaccine => "vaccine",
            EntityKind::Schedule => "vaccination schedule",
            EntityKind::ScheduleItem => "schedule item",
            EntityKind::Appointment => "appointment",
            EntityKind::Payment => "payment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error enumeration shared by every repository trait. A store `insert` or
/// `update` receives the whole aggregate and is the transaction boundary:
/// either the entire batch commits or none of it does.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
