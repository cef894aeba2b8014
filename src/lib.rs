//! # crm-engine - In-memory CRM core
//!
//! Four entity stores (contacts, companies, deals, tasks), a query engine
//! that searches, filters, sorts and paginates store snapshots, and an
//! aggregation engine that reduces snapshots to dashboard metrics. An async
//! service facade adds the simulated network latency a UI would see.
//!
//! ## Core Concepts
//!
//! - **Record**: a typed contact, company, deal or task with a store-assigned id
//! - **Draft / Patch**: the input of a create / update
//! - **Snapshot**: an owned copy of one collection that queries run against
//! - **Page**: one slice of query results plus the pre-slice match count
//! - **Metrics**: totals, rates and distributions for the dashboard
//!
//! ## Usage
//!
//! ```rust
//! use crm_engine::{EntityStore, InMemoryStore, QueryEngine, QueryParams, SortDirection};
//! use crm_engine::model::{Contact, ContactDraft};
//!
//! let store: InMemoryStore<Contact> = InMemoryStore::new();
//! store.create(ContactDraft::new("Ada Lovelace", "ada@example.com", "555 0101").company("Analytical"))?;
//! store.create(ContactDraft::new("Grace Hopper", "grace@example.com", "555 0102"))?;
//!
//! let params = QueryParams::builder()
//!     .search("example.com")
//!     .sort_by("name", SortDirection::Desc)
//!     .build()?;
//! let page = QueryEngine::default().query(&store.snapshot()?, &params)?;
//! assert_eq!(page.total_count, 2);
//! assert_eq!(page.items[0].name, "Grace Hopper");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod clock;
pub mod entity;
pub mod error;
pub mod model;
pub mod value;

// Storage, querying and aggregation
pub mod analytics;
pub mod query;
pub mod storage;

// Runtime surface
pub mod config;
pub mod logging;
pub mod service;

// Re-export primary types at crate root for convenience
pub use clock::{system_clock, Clock, ManualClock, SystemClock};
pub use entity::{EntityId, EntityKind};
pub use error::{CrmError, CrmResult, ValidationError};
pub use model::{
    Company, CompanyDraft, CompanyPatch, Contact, ContactDraft, ContactPatch, Deal, DealDraft, DealPatch, DealStage,
    Record, Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus,
};
pub use value::FieldValue;

pub use analytics::{AggregationEngine, Dashboard, Metrics, MonthlyRevenue, StageCount, VarianceSource};
pub use query::{Page, QueryEngine, QueryParams, SortDirection, SortSpec};
pub use storage::{EntityStore, InMemoryStore, InMemoryStores, SeedData, StorageError};

pub use config::CrmConfig;
pub use service::{CrmService, LatencyProfile, SimulatedStore};
