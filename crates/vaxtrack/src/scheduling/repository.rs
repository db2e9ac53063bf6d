use super::domain::{ScheduleId, ScheduleItemId, VaccinationSchedule};
use crate::children::ChildId;
use crate::store::StoreError;

/// Storage abstraction for schedules. Implementations persist the whole
/// aggregate (schedule plus items) per call; `insert` fails with
/// [`StoreError::Conflict`] when the child already has a schedule.
pub trait ScheduleRepository: Send + Sync {
    fn insert(&self, schedule: VaccinationSchedule) -> Result<VaccinationSchedule, StoreError>;
    fn update(&self, schedule: VaccinationSchedule) -> Result<(), StoreError>;
    fn fetch(&self, id: ScheduleId) -> Result<Option<VaccinationSchedule>, StoreError>;
    fn fetch_by_child(&self, child_id: ChildId) -> Result<Option<VaccinationSchedule>, StoreError>;
    fn fetch_containing_item(
        &self,
        item_id: ScheduleItemId,
    ) -> Result<Option<VaccinationSchedule>, StoreError>;
    fn delete(&self, id: ScheduleId) -> Result<(), StoreError>;
}
