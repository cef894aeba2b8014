use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use crm_engine::model::{ContactDraft, DealDraft};
use crm_engine::{CrmConfig, CrmService, DealStage, EntityId, LatencyProfile, QueryParams, SeedData};

const SEED: &str = r#"{
    "contacts": [
        {"id": 1, "name": "Ada Lovelace", "email": "ada@example.com", "phone": "555 0101",
         "company": "Analytical", "createdAt": "2024-01-05T10:00:00Z", "updatedAt": "2024-01-05T10:00:00Z"},
        {"id": 2, "name": "Grace Hopper", "email": "grace@example.com", "phone": "555 0102",
         "createdAt": "2024-02-10T10:00:00Z", "updatedAt": "2024-02-10T10:00:00Z"}
    ],
    "deals": [
        {"id": 1, "name": "Engine licence", "company": "Analytical", "contactName": "Ada Lovelace",
         "value": 1000, "stage": "Closed Won", "expectedCloseDate": "2024-03-01", "probability": 100,
         "description": "", "lastUpdated": "2024-03-01T00:00:00Z"},
        {"id": 2, "name": "Compiler support", "company": "Navy", "contactName": "Grace Hopper",
         "value": 2000, "stage": "Lead", "expectedCloseDate": "2024-09-01", "probability": 20,
         "description": "", "lastUpdated": "2024-03-01T00:00:00Z"}
    ]
}"#;

fn assert_elapsed(start: Instant, millis: u64) {
    let elapsed = start.elapsed();
    let expected = Duration::from_millis(millis);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

fn service() -> CrmService {
    let seed = SeedData::from_json_str(SEED).unwrap();
    CrmService::from_config(&CrmConfig::default(), seed).unwrap()
}

#[tokio::test(start_paused = true)]
async fn reads_and_writes_wait_for_configured_latency() {
    let svc = service();

    let start = Instant::now();
    let all = svc.contacts().get_all().await.unwrap();
    assert_elapsed(start, 300);
    assert_eq!(all.len(), 2);

    let start = Instant::now();
    svc.contacts()
        .create(ContactDraft::new("Alan Turing", "alan@example.com", "555 0103"))
        .await
        .unwrap();
    assert_elapsed(start, 300);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_do_not_queue_behind_each_other() {
    let svc = service();

    let start = Instant::now();
    let (contacts, deals) = tokio::join!(svc.contacts().get_all(), svc.deals().get_all());
    assert_elapsed(start, 300);
    assert_eq!(contacts.unwrap().len(), 2);
    assert_eq!(deals.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn analytics_waits_then_fetches_all_snapshots_in_parallel() {
    let svc = service();

    let start = Instant::now();
    let metrics = svc.analytics().await.unwrap();
    assert_elapsed(start, 800);

    assert!((metrics.total_revenue - 3000.0).abs() < f64::EPSILON);
    assert!((metrics.conversion_rate - 50.0).abs() < f64::EPSILON);
    assert_eq!(metrics.active_deals, 1);
    assert_eq!(metrics.total_contacts, 2);
    assert_eq!(metrics.revenue_by_month.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn seeded_ids_continue_and_queries_run_over_the_snapshot() {
    let svc = service();
    let due = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

    let deal = svc
        .deals()
        .create(DealDraft::new("Training", "Navy", "Grace Hopper", 500.0, due))
        .await
        .unwrap();
    assert_eq!(deal.id, EntityId::new(3));
    assert_eq!(deal.stage, DealStage::Lead);
    assert_eq!(deal.probability, 50);

    let page = svc
        .deals()
        .query(&QueryParams::builder().search("navy").build().unwrap())
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    let found = svc.contacts().search("hopper").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn no_latency_profile_is_immediate() {
    let config = CrmConfig {
        latency: LatencyProfile::none(),
        ..CrmConfig::default()
    };
    let svc = CrmService::from_config(&config, SeedData::from_json_str(SEED).unwrap()).unwrap();

    let start = std::time::Instant::now();
    for _ in 0..10 {
        svc.deals().get_all().await.unwrap();
    }
    assert!(start.elapsed() < Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn unsorted_query_keeps_newest_first() {
    let svc = service();

    let page = svc.contacts().query(&QueryParams::default()).await.unwrap();
    let ids: Vec<u64> = page.items.iter().map(|c| c.id.get()).collect();
    assert_eq!(ids, vec![2, 1]);

    let all: Vec<u64> = svc.contacts().get_all().await.unwrap().iter().map(|c| c.id.get()).collect();
    assert_eq!(ids, all);
}
