//! Child registry records referenced by schedules and appointments.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChildId(pub u64);

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the parent account owning a child record. Accounts and
/// authorization live outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub parent_id: ParentId,
}

/// Read access to the child registry.
pub trait ChildStore: Send + Sync {
    fn get(&self, id: ChildId) -> Result<Option<Child>, StoreError>;
}
