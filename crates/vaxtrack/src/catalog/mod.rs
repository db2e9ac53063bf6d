//! Read-only view of the vaccine catalog.
//!
//! Deactivating a vaccine stops it from appearing in newly generated
//! schedules; existing schedule items keep referencing it by id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Identifier wrapper for catalog vaccines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VaccineId(pub u64);

impl fmt::Display for VaccineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog vaccine record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: VaccineId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Recommended age window in whole months, in compact `"min-max"`
    /// notation (a trailing unit word such as `"2-4 months"` is tolerated).
    pub recommended_age: Option<String>,
    pub doses_required: u32,
    /// Interval between doses; only meaningful when `doses_required > 1`.
    pub days_between_doses: Option<i64>,
    pub active: bool,
}

impl Vaccine {
    /// Parsed age window, or `None` when the notation is absent or malformed.
    pub fn age_range(&self) -> Option<AgeRange> {
        self.recommended_age
            .as_deref()
            .and_then(|raw| AgeRange::parse(raw).ok())
    }
}

/// Inclusive recommended-age window in whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min_months: u32,
    pub max_months: u32,
}

impl AgeRange {
    pub fn parse(raw: &str) -> Result<Self, AgeRangeParseError> {
        let malformed = || AgeRangeParseError::Malformed(raw.to_string());

        let (lower, upper) = raw.split_once('-').ok_or_else(malformed)?;
        let min_months: u32 = lower.trim().parse().map_err(|_| malformed())?;

        let digits: String = upper
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return Err(malformed());
        }
        let max_months: u32 = digits.parse().map_err(|_| malformed())?;

        if min_months > max_months {
            return Err(AgeRangeParseError::Inverted {
                min: min_months,
                max: max_months,
            });
        }

        Ok(Self {
            min_months,
            max_months,
        })
    }

    pub fn contains(&self, age_months: u32) -> bool {
        (self.min_months..=self.max_months).contains(&age_months)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AgeRangeParseError {
    #[error("expected 'min-max' months notation, got '{0}'")]
    Malformed(String),
    #[error("age range lower bound {min} exceeds upper bound {max}")]
    Inverted { min: u32, max: u32 },
}

/// Storage abstraction over the vaccine catalog.
pub trait VaccineCatalog: Send + Sync {
    fn list_active(&self) -> Result<Vec<Vaccine>, StoreError>;
    fn get(&self, id: VaccineId) -> Result<Option<Vaccine>, StoreError>;
}
