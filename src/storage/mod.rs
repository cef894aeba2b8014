//! Entity storage.
//!
//! The trait defines the abstract interface for storage backends; the
//! in-memory backend is the only implementation shipped here.

mod memory;
mod seed;
mod traits;

pub use memory::{InMemoryStore, InMemoryStores};
pub use seed::SeedData;
pub use traits::{EntityStore, StorageError};
