use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::catalog::{Vaccine, VaccineCatalog, VaccineId};
use crate::children::{Child, ChildId, ChildStore, Gender, ParentId};
use crate::scheduling::domain::{ScheduleId, ScheduleItemId, VaccinationSchedule};
use crate::scheduling::repository::ScheduleRepository;
use crate::scheduling::service::ScheduleService;
use crate::store::StoreError;

#[derive(Default)]
pub(super) struct MemoryChildStore {
    children: Mutex<HashMap<ChildId, Child>>,
}

impl MemoryChildStore {
    pub(super) fn with_child(child: Child) -> Self {
        let store = Self::default();
        store
            .children
            .lock()
            .expect("child mutex poisoned")
            .insert(child.id, child);
        store
    }
}

impl ChildStore for MemoryChildStore {
    fn get(&self, id: ChildId) -> Result<Option<Child>, StoreError> {
        let guard = self.children.lock().expect("child mutex poisoned");
        Ok(guard.get(&id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    vaccines: Mutex<Vec<Vaccine>>,
}

impl MemoryCatalog {
    pub(super) fn with_vaccines(vaccines: Vec<Vaccine>) -> Self {
        Self {
            vaccines: Mutex::new(vaccines),
        }
    }
}

impl VaccineCatalog for MemoryCatalog {
    fn list_active(&self) -> Result<Vec<Vaccine>, StoreError> {
        let guard = self.vaccines.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().filter(|v| v.active).cloned().collect())
    }

    fn get(&self, id: VaccineId) -> Result<Option<Vaccine>, StoreError> {
        let guard = self.vaccines.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|v| v.id == id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryScheduleRepository {
    schedules: Mutex<HashMap<ScheduleId, VaccinationSchedule>>,
}

impl ScheduleRepository for MemoryScheduleRepository {
    fn insert(&self, schedule: VaccinationSchedule) -> Result<VaccinationSchedule, StoreError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.child_id == schedule.child_id)
        {
            return Err(StoreError::Conflict);
        }
        guard.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    fn update(&self, schedule: VaccinationSchedule) -> Result<(), StoreError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        if guard.contains_key(&schedule.id) {
            guard.insert(schedule.id, schedule);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: ScheduleId) -> Result<Option<VaccinationSchedule>, StoreError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn fetch_by_child(&self, child_id: ChildId) -> Result<Option<VaccinationSchedule>, StoreError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard
            .values()
            .find(|schedule| schedule.child_id == child_id)
            .cloned())
    }

    fn fetch_containing_item(
        &self,
        item_id: ScheduleItemId,
    ) -> Result<Option<VaccinationSchedule>, StoreError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard
            .values()
            .find(|schedule| schedule.item(item_id).is_some())
            .cloned())
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

pub(super) fn child_born_on(id: u64, birth_date: NaiveDate) -> Child {
    Child {
        id: ChildId(id),
        name: "An".to_string(),
        birth_date,
        gender: Gender::Female,
        parent_id: ParentId(7),
    }
}

pub(super) fn vaccine(id: u64, name: &str, recommended_age: Option<&str>) -> Vaccine {
    Vaccine {
        id: VaccineId(id),
        name: name.to_string(),
        description: None,
        recommended_age: recommended_age.map(str::to_string),
        doses_required: 1,
        days_between_doses: None,
        active: true,
    }
}

pub(super) fn three_dose_vaccine(id: u64) -> Vaccine {
    Vaccine {
        doses_required: 3,
        days_between_doses: Some(30),
        ..vaccine(id, "Hexavalent", Some("2-4"))
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn service_with(
    child: Child,
    vaccines: Vec<Vaccine>,
) -> (
    ScheduleService<MemoryChildStore, MemoryCatalog, MemoryScheduleRepository>,
    Arc<MemoryScheduleRepository>,
) {
    let children = Arc::new(MemoryChildStore::with_child(child));
    let catalog = Arc::new(MemoryCatalog::with_vaccines(vaccines));
    let repository = Arc::new(MemoryScheduleRepository::default());
    let service = ScheduleService::new(children, catalog, repository.clone());
    (service, repository)
}
