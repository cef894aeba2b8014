//! Async facade over the stores with simulated network latency.
//!
//! Each call awaits its own delay before touching the store, so concurrent
//! callers never wait on each other's latency. Delays never fail and there
//! is no cancellation or retry: a dropped future simply never runs its
//! store operation.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::{AggregationEngine, Dashboard, Metrics};
use crate::clock::{system_clock, Clock};
use crate::config::CrmConfig;
use crate::entity::EntityId;
use crate::error::{CrmError, CrmResult};
use crate::model::{parse_draft, parse_patch, Company, Contact, Deal, DealStage, Record, Task};
use crate::query::{self, Page, QueryEngine, QueryParams};
use crate::storage::{EntityStore, InMemoryStores, SeedData};

/// Simulated round-trip delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyProfile {
    pub read_ms: u64,
    pub write_ms: u64,
    pub analytics_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            read_ms: 300,
            write_ms: 300,
            analytics_ms: 500,
        }
    }
}

impl LatencyProfile {
    /// No delay anywhere.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            read_ms: 0,
            write_ms: 0,
            analytics_ms: 0,
        }
    }

    pub const fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub const fn write(&self) -> Duration {
        Duration::from_millis(self.write_ms)
    }

    pub const fn analytics(&self) -> Duration {
        Duration::from_millis(self.analytics_ms)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// One entity store behind simulated latency.
pub struct SimulatedStore<R: Record> {
    store: Arc<dyn EntityStore<R>>,
    engine: Arc<QueryEngine>,
    latency: LatencyProfile,
}

impl<R: Record> Clone for SimulatedStore<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: Arc::clone(&self.engine),
            latency: self.latency,
        }
    }
}

impl<R: Record> std::fmt::Debug for SimulatedStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedStore")
            .field("kind", &R::KIND)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl<R: Record> SimulatedStore<R> {
    pub fn new(store: Arc<dyn EntityStore<R>>, engine: Arc<QueryEngine>, latency: LatencyProfile) -> Self {
        Self { store, engine, latency }
    }

    /// The wrapped store, for synchronous access without latency.
    pub fn inner(&self) -> &Arc<dyn EntityStore<R>> {
        &self.store
    }

    /// All records, newest first.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_all(&self) -> CrmResult<Vec<R>> {
        pause(self.latency.read()).await;
        Ok(self.store.get_all()?)
    }

    /// All records in insertion order.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn snapshot(&self) -> CrmResult<Vec<R>> {
        pause(self.latency.read()).await;
        Ok(self.store.snapshot()?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no record has `id`.
    pub async fn get_by_id(&self, id: EntityId) -> CrmResult<R> {
        pause(self.latency.read()).await;
        Ok(self.store.get_by_id(id)?)
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` when the draft fails validation.
    pub async fn create(&self, draft: R::Draft) -> CrmResult<R> {
        pause(self.latency.write()).await;
        Ok(self.store.create(draft)?)
    }

    /// Create from a JSON object; unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed payload or invalid draft.
    pub async fn create_json(&self, json: serde_json::Value) -> CrmResult<R> {
        let draft = parse_draft::<R>(json)?;
        self.create(draft).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if absent, `InvalidArgument` if the merged record
    /// is invalid.
    pub async fn update(&self, id: EntityId, patch: R::Patch) -> CrmResult<R> {
        pause(self.latency.write()).await;
        Ok(self.store.update(id, patch)?)
    }

    /// Update from a JSON object; omitted fields are kept, `null` clears an
    /// optional field.
    ///
    /// # Errors
    ///
    /// As [`SimulatedStore::update`], plus `InvalidArgument` for a malformed
    /// payload.
    pub async fn update_json(&self, id: EntityId, json: serde_json::Value) -> CrmResult<R> {
        let patch = parse_patch::<R>(json)?;
        self.update(id, patch).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn delete(&self, id: EntityId) -> CrmResult<()> {
        pause(self.latency.write()).await;
        Ok(self.store.delete(id)?)
    }

    /// Records whose searchable fields contain `text`; newest first.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn search(&self, text: &str) -> CrmResult<Vec<R>> {
        let all = self.get_all().await?;
        Ok(query::search(&all, text))
    }

    /// Run a query over the collection. Without a sort, results stay newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for bad params or an unknown filter field.
    pub async fn query(&self, params: &QueryParams) -> CrmResult<Page<R>> {
        let all = self.get_all().await?;
        self.engine.query(&all, params)
    }
}

impl SimulatedStore<Deal> {
    /// Deals in `stage`, newest first.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn by_stage(&self, stage: DealStage) -> CrmResult<Vec<Deal>> {
        let mut deals = self.get_all().await?;
        deals.retain(|d| d.stage == stage);
        Ok(deals)
    }
}

/// The four stores plus the query and aggregation engines.
#[derive(Debug, Clone)]
pub struct CrmService {
    contacts: SimulatedStore<Contact>,
    companies: SimulatedStore<Company>,
    deals: SimulatedStore<Deal>,
    tasks: SimulatedStore<Task>,
    query: Arc<QueryEngine>,
    aggregation: AggregationEngine,
    latency: LatencyProfile,
}

/// Store handles for [`CrmService::with_stores`].
pub struct ServiceStores {
    pub contacts: Arc<dyn EntityStore<Contact>>,
    pub companies: Arc<dyn EntityStore<Company>>,
    pub deals: Arc<dyn EntityStore<Deal>>,
    pub tasks: Arc<dyn EntityStore<Task>>,
}

impl From<InMemoryStores> for ServiceStores {
    fn from(stores: InMemoryStores) -> Self {
        Self {
            contacts: Arc::new(stores.contacts),
            companies: Arc::new(stores.companies),
            deals: Arc::new(stores.deals),
            tasks: Arc::new(stores.tasks),
        }
    }
}

impl CrmService {
    /// Seeded in-memory service on the wall clock.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid config or seed.
    pub fn from_config(config: &CrmConfig, seed: SeedData) -> CrmResult<Self> {
        Self::from_config_with_clock(config, seed, system_clock())
    }

    /// As [`CrmService::from_config`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid config or seed.
    pub fn from_config_with_clock(config: &CrmConfig, seed: SeedData, clock: Arc<dyn Clock>) -> CrmResult<Self> {
        config.validate()?;
        let stores = InMemoryStores::init(seed, Arc::clone(&clock))?;
        Ok(Self::with_stores(stores.into(), config, clock))
    }

    /// Service over arbitrary store implementations.
    pub fn with_stores(stores: ServiceStores, config: &CrmConfig, clock: Arc<dyn Clock>) -> Self {
        let query = Arc::new(QueryEngine::new(&config.query));
        let latency = config.latency;
        Self {
            contacts: SimulatedStore::new(stores.contacts, Arc::clone(&query), latency),
            companies: SimulatedStore::new(stores.companies, Arc::clone(&query), latency),
            deals: SimulatedStore::new(stores.deals, Arc::clone(&query), latency),
            tasks: SimulatedStore::new(stores.tasks, Arc::clone(&query), latency),
            query,
            aggregation: AggregationEngine::new(&config.analytics, clock),
            latency,
        }
    }

    pub fn contacts(&self) -> &SimulatedStore<Contact> {
        &self.contacts
    }

    pub fn companies(&self) -> &SimulatedStore<Company> {
        &self.companies
    }

    pub fn deals(&self) -> &SimulatedStore<Deal> {
        &self.deals
    }

    pub fn tasks(&self) -> &SimulatedStore<Task> {
        &self.tasks
    }

    pub fn query_engine(&self) -> &QueryEngine {
        &self.query
    }

    pub fn aggregation_engine(&self) -> &AggregationEngine {
        &self.aggregation
    }

    /// Replace the aggregation engine, e.g. to pin the variance source.
    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationEngine) -> Self {
        self.aggregation = aggregation;
        self
    }

    async fn snapshots(&self) -> CrmResult<(Vec<Deal>, Vec<Contact>, Vec<Company>, Vec<Task>)> {
        pause(self.latency.analytics()).await;
        tokio::try_join!(
            self.deals.snapshot(),
            self.contacts.snapshot(),
            self.companies.snapshot(),
            self.tasks.snapshot(),
        )
        .map_err(|e| {
            warn!(component = "analytics", error = %e, "snapshot fetch failed");
            CrmError::analytics_unavailable(&e)
        })
    }

    /// Headline dashboard metrics over all four collections.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsUnavailable` if any snapshot cannot be read; no
    /// partial result is produced.
    pub async fn analytics(&self) -> CrmResult<Metrics> {
        let (deals, contacts, companies, tasks) = self.snapshots().await?;
        let metrics = self.aggregation.compute_metrics(&deals, &contacts, &companies, &tasks);
        info!(
            component = "analytics",
            op = "analytics",
            deals = deals.len(),
            contacts = contacts.len(),
            "analytics ready"
        );
        Ok(metrics)
    }

    /// Metrics plus deal, contact and task summaries.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsUnavailable` if any snapshot cannot be read.
    pub async fn dashboard(&self) -> CrmResult<Dashboard> {
        let (deals, contacts, companies, tasks) = self.snapshots().await?;
        let dashboard = self.aggregation.compute_dashboard(&deals, &contacts, &companies, &tasks);
        info!(component = "analytics", op = "dashboard", tasks = tasks.len(), "dashboard ready");
        Ok(dashboard)
    }
}
