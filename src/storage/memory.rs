//! In-memory storage backend.
//!
//! This module provides thread-safe in-memory implementations of the storage
//! trait. State lives for the lifetime of the store value; dropping it and
//! re-running `init` with the seed data resets every collection.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::clock::{system_clock, Clock};
use crate::entity::EntityId;
use crate::error::ValidationError;
use crate::model::{Company, Contact, Deal, Record, Task};
use crate::storage::seed::SeedData;
use crate::storage::traits::{EntityStore, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug)]
struct CollectionState<R> {
    /// Insertion order.
    records: Vec<R>,
    /// Highest id ever assigned or seeded; ids above it are fresh.
    high_water: EntityId,
}

impl<R: Record> CollectionState<R> {
    fn position(&self, id: EntityId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn next_id(&self) -> EntityId {
        let max_live = self
            .records
            .iter()
            .map(|r| r.id())
            .max()
            .unwrap_or(EntityId::new(0));
        max_live.max(self.high_water).next()
    }
}

/// Thread-safe in-memory store for one record kind.
///
/// All mutations take the write lock for their whole read-modify-write, so a
/// collection has a single writer at a time.
pub struct InMemoryStore<R: Record> {
    state: RwLock<CollectionState<R>>,
    clock: Arc<dyn Clock>,
}

impl<R: Record> fmt::Debug for InMemoryStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("kind", &R::KIND)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryStore<R> {
    /// Create a new empty store on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create a new empty store on the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(CollectionState {
                records: Vec::new(),
                high_water: EntityId::new(0),
            }),
            clock,
        }
    }

    /// Create a store holding `records` in the given order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if two records share an id, `ReservedId` if
    /// any record uses id 0, and the record's own `ValidationError` if it
    /// fails the checks a create would apply.
    pub fn with_records(records: Vec<R>, clock: Arc<dyn Clock>) -> Result<Self, ValidationError> {
        let records: Vec<R> = records.into_iter().map(Record::normalized).collect();
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            let id = record.id();
            if !id.is_assigned() {
                return Err(ValidationError::ReservedId { kind: R::KIND });
            }
            if !seen.insert(id) {
                return Err(ValidationError::DuplicateId { kind: R::KIND, id });
            }
            record.validate()?;
        }
        let high_water = records
            .iter()
            .map(|r| r.id())
            .max()
            .unwrap_or(EntityId::new(0));

        debug!(
            component = "storage",
            op = "seed",
            kind = %R::KIND,
            count = records.len(),
            high_water = %high_water,
            "collection seeded"
        );

        Ok(Self {
            state: RwLock::new(CollectionState { records, high_water }),
            clock,
        })
    }
}

impl<R: Record> EntityStore<R> for InMemoryStore<R> {
    fn get_all(&self) -> Result<Vec<R>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("store.get_all"))?;
        let mut out = state.records.clone();
        out.sort_by(|a, b| b.id().cmp(&a.id()));
        Ok(out)
    }

    fn snapshot(&self) -> Result<Vec<R>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("store.snapshot"))?;
        Ok(state.records.clone())
    }

    fn get_by_id(&self, id: EntityId) -> Result<R, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("store.get_by_id"))?;
        state
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound { kind: R::KIND, id })
    }

    fn create(&self, draft: R::Draft) -> Result<R, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("store.create"))?;
        let id = state.next_id();
        let record = R::from_draft(id, draft, self.clock.now())?;

        state.high_water = id;
        state.records.push(record.clone());
        debug!(component = "storage", op = "create", kind = %R::KIND, id = %id);
        Ok(record)
    }

    fn update(&self, id: EntityId, patch: R::Patch) -> Result<R, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("store.update"))?;
        let index = state
            .position(id)
            .ok_or(StorageError::NotFound { kind: R::KIND, id })?;

        // Build the replacement first; the slot only changes if it validates.
        let next = state.records[index].merged(patch, self.clock.now())?;
        state.records[index] = next.clone();
        debug!(component = "storage", op = "update", kind = %R::KIND, id = %id);
        Ok(next)
    }

    fn delete(&self, id: EntityId) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("store.delete"))?;
        let index = state
            .position(id)
            .ok_or(StorageError::NotFound { kind: R::KIND, id })?;
        state.records.remove(index);
        debug!(component = "storage", op = "delete", kind = %R::KIND, id = %id);
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("store.len"))?;
        Ok(state.records.len())
    }
}

/// Convenience bundle of in-memory stores, one per record kind.
#[derive(Debug, Default)]
pub struct InMemoryStores {
    /// Contact store.
    pub contacts: InMemoryStore<Contact>,
    /// Company store.
    pub companies: InMemoryStore<Company>,
    /// Deal store.
    pub deals: InMemoryStore<Deal>,
    /// Task store.
    pub tasks: InMemoryStore<Task>,
}

impl InMemoryStores {
    /// Create an empty bundle on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bundle holding the seed collections.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if any collection has duplicate or zero
    /// ids or holds a record that fails validation.
    pub fn init(seed: SeedData, clock: Arc<dyn Clock>) -> Result<Self, ValidationError> {
        Ok(Self {
            contacts: InMemoryStore::with_records(seed.contacts, Arc::clone(&clock))?,
            companies: InMemoryStore::with_records(seed.companies, Arc::clone(&clock))?,
            deals: InMemoryStore::with_records(seed.deals, Arc::clone(&clock))?,
            tasks: InMemoryStore::with_records(seed.tasks, clock)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use crate::clock::ManualClock;
    use crate::entity::EntityKind;
    use crate::model::{ContactDraft, ContactPatch, TaskDraft, TaskPatch, TaskStatus};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()))
    }

    fn draft(name: &str) -> ContactDraft {
        ContactDraft::new(name, format!("{}@example.com", name.to_lowercase()), "555 0100")
    }

    #[test]
    fn contact_create_get_update_delete() {
        let clock = clock();
        let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock.clone());

        let created = store.create(draft("Ada")).unwrap();
        assert_eq!(created.id, EntityId::new(1));
        assert_eq!(store.get_by_id(created.id).unwrap(), created);

        clock.advance(Duration::minutes(10));
        let updated = store
            .update(
                created.id,
                ContactPatch {
                    company: Some(Some("Engines Ltd".to_string())),
                    ..ContactPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.company.as_deref(), Some("Engines Ltd"));
        assert_eq!(updated.updated_at, created.updated_at + Duration::minutes(10));

        store.delete(created.id).unwrap();
        assert!(matches!(
            store.get_by_id(created.id),
            Err(StorageError::NotFound { kind: EntityKind::Contact, .. })
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn ids_are_never_reused_after_deleting_the_max() {
        let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
        let a = store.create(draft("Ada")).unwrap();
        let b = store.create(draft("Bob")).unwrap();
        store.delete(b.id).unwrap();

        let c = store.create(draft("Cy")).unwrap();
        assert_eq!(a.id, EntityId::new(1));
        assert_eq!(c.id, EntityId::new(3));
    }

    #[test]
    fn get_all_is_newest_first_but_snapshot_keeps_insertion_order() {
        let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
        for name in ["Ada", "Bob", "Cy"] {
            store.create(draft(name)).unwrap();
        }

        let newest_first: Vec<u64> = store.get_all().unwrap().iter().map(|c| c.id.get()).collect();
        assert_eq!(newest_first, vec![3, 2, 1]);

        let inserted: Vec<u64> = store.snapshot().unwrap().iter().map(|c| c.id.get()).collect();
        assert_eq!(inserted, vec![1, 2, 3]);
    }

    #[test]
    fn update_and_delete_missing_ids_are_not_found() {
        let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
        assert!(matches!(
            store.update(EntityId::new(9), ContactPatch::default()),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(store.delete(EntityId::new(9)), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn failed_validation_leaves_slot_untouched() {
        let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
        let created = store.create(draft("Ada")).unwrap();
        let err = store
            .update(
                created.id,
                ContactPatch {
                    name: Some("   ".to_string()),
                    ..ContactPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(ValidationError::BlankField { field: "name" })));
        assert_eq!(store.get_by_id(created.id).unwrap(), created);
    }

    #[test]
    fn failed_create_does_not_consume_an_id() {
        let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
        assert!(store.create(ContactDraft::new("", "x@y.z", "1")).is_err());
        assert_eq!(store.create(draft("Ada")).unwrap().id, EntityId::new(1));
    }

    #[test]
    fn task_update_recomputes_completed() {
        let store: InMemoryStore<Task> = InMemoryStore::with_clock(clock());
        let due = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let task = store.create(TaskDraft::new("Follow up", due)).unwrap();
        assert!(!task.completed);

        let done = store
            .update(
                task.id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert!(done.completed);
    }

    #[test]
    fn seeded_store_continues_after_highest_seed_id() {
        let seeded = InMemoryStore::<Contact>::with_clock(clock());
        let mut first = seeded.create(draft("Ada")).unwrap();
        first.id = EntityId::new(40);

        let store = InMemoryStore::with_records(vec![first], clock()).unwrap();
        assert_eq!(store.create(draft("Bob")).unwrap().id, EntityId::new(41));
    }

    #[test]
    fn seed_rejects_duplicate_and_zero_ids() {
        let scratch = InMemoryStore::<Contact>::with_clock(clock());
        let a = scratch.create(draft("Ada")).unwrap();

        let err = InMemoryStore::with_records(vec![a.clone(), a.clone()], clock()).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { kind: EntityKind::Contact, .. }));

        let mut zero = a;
        zero.id = EntityId::new(0);
        let err = InMemoryStore::with_records(vec![zero], clock()).unwrap_err();
        assert_eq!(err, ValidationError::ReservedId { kind: EntityKind::Contact });
    }

    #[test]
    fn seed_rejects_records_that_fail_validation() {
        let scratch = InMemoryStore::<Contact>::with_clock(clock());
        let mut blank = scratch.create(draft("Ada")).unwrap();
        blank.name = "  ".to_string();

        let err = InMemoryStore::with_records(vec![blank], clock()).unwrap_err();
        assert_eq!(err, ValidationError::BlankField { field: "name" });
    }
}
