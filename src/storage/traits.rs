//! Abstract storage contract for CRM records.
//!
//! One store owns one collection of a single record kind. Using a trait lets
//! callers hold stores as `Arc<dyn EntityStore<R>>`, so the in-memory backend
//! can later be swapped for a concurrency-safe persistent one.

use thiserror::Error;

use crate::entity::{EntityId, EntityKind};
use crate::error::{CrmError, ValidationError};
use crate::model::Record;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record with this id.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// The record (or merged record) failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Backend failure, e.g. a poisoned lock.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for CrmError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { kind, id } => Self::NotFound { kind, id },
            StorageError::Validation(v) => Self::InvalidArgument(v),
            StorageError::Backend(message) => Self::Internal { message },
        }
    }
}

/// Storage trait for a single record kind.
///
/// # Ordering
/// - Insertion order is preserved internally.
/// - `get_all` applies the default presentation order (id descending).
/// - `snapshot` returns insertion order.
pub trait EntityStore<R: Record>: Send + Sync {
    /// All records, newest (highest id) first.
    fn get_all(&self) -> Result<Vec<R>, StorageError>;

    /// All records in insertion order.
    fn snapshot(&self) -> Result<Vec<R>, StorageError>;

    /// Get a record by id. Returns `NotFound` if absent.
    fn get_by_id(&self, id: EntityId) -> Result<R, StorageError>;

    /// Assign an id and timestamps, store, and return a copy.
    fn create(&self, draft: R::Draft) -> Result<R, StorageError>;

    /// Merge `patch` over the record and return a copy. Returns `NotFound`
    /// if absent. The id never changes.
    fn update(&self, id: EntityId, patch: R::Patch) -> Result<R, StorageError>;

    /// Remove a record. Returns `NotFound` if absent.
    fn delete(&self, id: EntityId) -> Result<(), StorageError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, StorageError>;

    /// True when the collection is empty.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
