use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::domain::{
    ScheduleId, ScheduleItem, ScheduleItemDraft, ScheduleItemId, ScheduleItemStatus, ScheduleKind,
    VaccinationSchedule,
};
use super::generator::plan_vaccine_doses;
use super::repository::ScheduleRepository;
use crate::catalog::VaccineCatalog;
use crate::children::{ChildId, ChildStore};
use crate::store::{EntityKind, StoreError};

/// Service composing the child registry, catalog, and schedule store.
pub struct ScheduleService<C, K, R> {
    children: Arc<C>,
    catalog: Arc<K>,
    repository: Arc<R>,
}

static SCHEDULE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SCHEDULE_ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_schedule_id() -> ScheduleId {
    ScheduleId(SCHEDULE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_item_id() -> ScheduleItemId {
    ScheduleItemId(SCHEDULE_ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<C, K, R> ScheduleService<C, K, R>
where
    C: ChildStore + 'static,
    K: VaccineCatalog + 'static,
    R: ScheduleRepository + 'static,
{
    pub fn new(children: Arc<C>, catalog: Arc<K>, repository: Arc<R>) -> Self {
        Self {
            children,
            catalog,
            repository,
        }
    }

    /// Generate the standard schedule for a child from the active catalog.
    ///
    /// A vaccine whose age window fails to parse is omitted and the rest of
    /// the generation proceeds; the whole aggregate is persisted in one
    /// `insert`.
    pub fn create_standard_schedule(
        &self,
        child_id: ChildId,
        today: NaiveDate,
    ) -> Result<VaccinationSchedule, ScheduleServiceError> {
        let child = self
            .children
            .get(child_id)?
            .ok_or(ScheduleServiceError::NotFound {
                entity: EntityKind::Child,
                id: child_id.0,
            })?;

        if self.repository.fetch_by_child(child_id)?.is_some() {
            return Err(ScheduleServiceError::AlreadyExists { child_id });
        }

        let mut items = Vec::new();
        for vaccine in self.catalog.list_active()? {
            match plan_vaccine_doses(&vaccine, child.birth_date, today) {
                Some(doses) => {
                    for dose in doses {
                        items.push(ScheduleItem {
                            id: next_item_id(),
                            vaccine_id: dose.vaccine_id,
                            dose_number: dose.dose_number,
                            recommended_date: dose.recommended_date,
                            status: ScheduleItemStatus::Pending,
                            notes: None,
                        });
                    }
                }
                None => {
                    debug!(vaccine = %vaccine.id, name = %vaccine.name,
                        "skipping vaccine without a parseable age window");
                }
            }
        }

        let schedule = VaccinationSchedule {
            id: next_schedule_id(),
            child_id,
            kind: ScheduleKind::Standard,
            items,
        };

        match self.repository.insert(schedule) {
            Ok(stored) => Ok(stored),
            Err(StoreError::Conflict) => Err(ScheduleServiceError::AlreadyExists { child_id }),
            Err(other) => Err(other.into()),
        }
    }

    pub fn get_by_child(
        &self,
        child_id: ChildId,
    ) -> Result<VaccinationSchedule, ScheduleServiceError> {
        self.repository
            .fetch_by_child(child_id)?
            .ok_or(ScheduleServiceError::NotFound {
                entity: EntityKind::Schedule,
                id: child_id.0,
            })
    }

    /// Replace the entire item set and switch the schedule to `Custom`.
    pub fn customize(
        &self,
        schedule_id: ScheduleId,
        drafts: Vec<ScheduleItemDraft>,
    ) -> Result<VaccinationSchedule, ScheduleServiceError> {
        let mut schedule =
            self.repository
                .fetch(schedule_id)?
                .ok_or(ScheduleServiceError::NotFound {
                    entity: EntityKind::Schedule,
                    id: schedule_id.0,
                })?;

        schedule.kind = ScheduleKind::Custom;
        schedule.items = drafts
            .into_iter()
            .map(|draft| ScheduleItem {
                id: next_item_id(),
                vaccine_id: draft.vaccine_id,
                dose_number: draft.dose_number,
                recommended_date: draft.recommended_date,
                status: draft.status,
                notes: draft.notes,
            })
            .collect();

        self.repository.update(schedule.clone())?;
        Ok(schedule)
    }

    /// Transition one item's status. Sibling dose ordering is not enforced.
    pub fn update_item_status(
        &self,
        item_id: ScheduleItemId,
        status: ScheduleItemStatus,
    ) -> Result<ScheduleItem, ScheduleServiceError> {
        let mut schedule = self.repository.fetch_containing_item(item_id)?.ok_or(
            ScheduleServiceError::NotFound {
                entity: EntityKind::ScheduleItem,
                id: item_id.0,
            },
        )?;

        let item = schedule
            .item_mut(item_id)
            .ok_or(ScheduleServiceError::NotFound {
                entity: EntityKind::ScheduleItem,
                id: item_id.0,
            })?;
        item.status = status;
        let updated = item.clone();

        self.repository.update(schedule)?;
        Ok(updated)
    }

    pub fn delete(&self, schedule_id: ScheduleId) -> Result<(), ScheduleServiceError> {
        match self.repository.delete(schedule_id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(ScheduleServiceError::NotFound {
                entity: EntityKind::Schedule,
                id: schedule_id.0,
            }),
            Err(other) => Err(other.into()),
        }
    }
}

/// Error raised by the schedule service.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },
    #[error("vaccination schedule already exists for child {child_id}")]
    AlreadyExists { child_id: ChildId },
    #[error(transparent)]
    Store(#[from] StoreError),
}
