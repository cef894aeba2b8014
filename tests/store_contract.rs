use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use crm_engine::model::{ContactDraft, ContactPatch, DealDraft, DealPatch};
use crm_engine::model::TaskPatch;
use crm_engine::{
    Contact, CrmError, Deal, EntityId, EntityKind, EntityStore, InMemoryStore, InMemoryStores, ManualClock,
    SeedData, StorageError, TaskStatus, ValidationError,
};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()))
}

fn contact(name: &str) -> ContactDraft {
    ContactDraft::new(name, format!("{}@example.com", name.to_lowercase()), "+1 (555) 010-0000")
}

#[test]
fn created_record_reads_back_equal() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    let created = store.create(contact("Ada").company("Analytical Engines")).unwrap();

    let fetched = store.get_by_id(created.id).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.last_contact_date, None);
    assert_eq!(fetched.company.as_deref(), Some("Analytical Engines"));
}

#[test]
fn ids_are_never_reused_after_deleting_the_max() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    let first = store.create(contact("A")).unwrap();
    let second = store.create(contact("B")).unwrap();
    assert_eq!((first.id.get(), second.id.get()), (1, 2));

    store.delete(second.id).unwrap();
    let third = store.create(contact("C")).unwrap();
    assert_eq!(third.id, EntityId::new(3));
}

#[test]
fn empty_patch_only_restamps_modification_time() {
    let clock = clock();
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock.clone());
    let created = store.create(contact("Ada")).unwrap();

    clock.advance(Duration::minutes(5));
    let updated = store.update(created.id, ContactPatch::default()).unwrap();

    assert_eq!(updated.updated_at, created.updated_at + Duration::minutes(5));
    assert_eq!(
        Contact {
            updated_at: created.updated_at,
            ..updated
        },
        created
    );
}

#[test]
fn patch_with_foreign_id_keeps_stored_id() {
    let store: InMemoryStore<Deal> = InMemoryStore::with_clock(clock());
    let due = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let deal = store.create(DealDraft::new("Renewal", "Acme", "Jo", 5000.0, due)).unwrap();

    let updated = store
        .update(
            deal.id,
            DealPatch {
                id: Some(EntityId::new(99)),
                value: Some(7500.0),
                ..DealPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.id, deal.id);
    assert!((updated.value - 7500.0).abs() < f64::EPSILON);
    assert!(store.get_by_id(EntityId::new(99)).is_err());
}

#[test]
fn null_clears_and_omission_keeps() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    let created = store.create(contact("Ada").company("Acme")).unwrap();

    let kept: ContactPatch = serde_json::from_str(r#"{"name":"Ada L."}"#).unwrap();
    let after_keep = store.update(created.id, kept).unwrap();
    assert_eq!(after_keep.company.as_deref(), Some("Acme"));

    let cleared: ContactPatch = serde_json::from_str(r#"{"company":null}"#).unwrap();
    let after_clear = store.update(created.id, cleared).unwrap();
    assert_eq!(after_clear.company, None);
    assert_eq!(after_clear.name, "Ada L.");
}

#[test]
fn delete_then_get_is_not_found() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    let created = store.create(contact("Ada")).unwrap();
    store.delete(created.id).unwrap();

    let err = store.get_by_id(created.id).unwrap_err();
    assert!(matches!(
        err,
        StorageError::NotFound {
            kind: EntityKind::Contact,
            ..
        }
    ));
    let crm: CrmError = store.delete(created.id).unwrap_err().into();
    assert!(crm.is_not_found());
}

#[test]
fn get_all_is_newest_first_and_snapshot_is_insertion_order() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    for name in ["A", "B", "C"] {
        store.create(contact(name)).unwrap();
    }
    let newest_first: Vec<u64> = store.get_all().unwrap().iter().map(|c| c.id.get()).collect();
    let inserted: Vec<u64> = store.snapshot().unwrap().iter().map(|c| c.id.get()).collect();
    assert_eq!(newest_first, vec![3, 2, 1]);
    assert_eq!(inserted, vec![1, 2, 3]);
}

#[test]
fn snapshots_are_independent_copies() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    store.create(contact("Ada")).unwrap();

    let mut snapshot = store.snapshot().unwrap();
    snapshot[0].name = "Mutated".to_string();
    snapshot.clear();

    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.get_by_id(EntityId::new(1)).unwrap().name, "Ada");
}

#[test]
fn invalid_drafts_are_rejected_without_side_effects() {
    let store: InMemoryStore<Contact> = InMemoryStore::with_clock(clock());
    let err = store
        .create(ContactDraft::new("Ada", "not-an-email", "555"))
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
    assert!(store.is_empty().unwrap());

    let ok = store.create(contact("Ada")).unwrap();
    assert_eq!(ok.id, EntityId::new(1));
}

#[test]
fn seeded_bundle_continues_numbering() {
    let seed = SeedData::from_json_str(
        r#"{
            "contacts": [
                {"id": 4, "name": "Ada", "email": "ada@example.com", "phone": "555",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}
            ]
        }"#,
    )
    .unwrap();
    let stores = InMemoryStores::init(seed, clock()).unwrap();
    let next = stores.contacts.create(contact("Grace")).unwrap();
    assert_eq!(next.id, EntityId::new(5));
    assert!(stores.deals.is_empty().unwrap());
}

#[test]
fn seeded_tasks_derive_completed_from_status() {
    let seed = SeedData::from_json_str(
        r#"{
            "tasks": [
                {"id": 1, "title": "Send contract", "status": "Completed", "priority": "High",
                 "dueDate": "2024-04-01", "createdAt": "2024-03-01T00:00:00Z"},
                {"id": 2, "title": "Call back", "status": "Pending", "priority": "Low",
                 "dueDate": "2024-04-01", "completed": true, "createdAt": "2024-03-01T00:00:00Z"}
            ]
        }"#,
    )
    .unwrap();
    let stores = InMemoryStores::init(seed, clock()).unwrap();

    let done = stores.tasks.get_by_id(EntityId::new(1)).unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.completed);
    assert!(!stores.tasks.get_by_id(EntityId::new(2)).unwrap().completed);
}

fn deal_seed(name: &str, value: f64) -> SeedData {
    SeedData::from_json_str(&format!(
        r#"{{
            "deals": [
                {{"id": 1, "name": "{name}", "company": "Acme", "contactName": "Jo", "value": {value},
                 "stage": "Lead", "expectedCloseDate": "2024-09-01", "probability": 20,
                 "description": "", "lastUpdated": "2024-03-01T00:00:00Z"}}
            ]
        }}"#
    ))
    .unwrap()
}

#[test]
fn seed_with_invalid_record_is_rejected() {
    let err = InMemoryStores::init(deal_seed("", 100.0), clock()).unwrap_err();
    assert_eq!(err, ValidationError::BlankField { field: "name" });

    let err = InMemoryStores::init(deal_seed("Renewal", -5.0), clock()).unwrap_err();
    assert!(matches!(err, ValidationError::OutOfRange { field: "value", .. }));

    assert!(InMemoryStores::init(deal_seed("Renewal", 100.0), clock()).is_ok());
}

#[test]
fn seeded_records_accept_an_empty_patch() {
    let seed = SeedData::from_json_str(
        r#"{
            "tasks": [
                {"id": 3, "title": "Review", "status": "In Progress", "priority": "Medium",
                 "dueDate": "2024-04-01", "createdAt": "2024-03-01T00:00:00Z"}
            ]
        }"#,
    )
    .unwrap();
    let stores = InMemoryStores::init(seed, clock()).unwrap();
    let task = stores.tasks.update(EntityId::new(3), TaskPatch::default()).unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
}
