//! Typed CRM records.
//!
//! Each entity kind is an explicit record with its required and optional
//! fields declared up front. Creates take a `*Draft`, updates take a
//! `*Patch` whose fields are all optional; both reject unknown fields when
//! decoded from JSON.

mod company;
mod contact;
mod deal;
mod task;

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::error::ValidationError;
use crate::value::FieldValue;

pub use company::{Company, CompanyDraft, CompanyPatch};
pub use contact::{Contact, ContactDraft, ContactPatch};
pub use deal::{Deal, DealDraft, DealPatch, DealStage};
pub use task::{Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus};

/// Behaviour shared by every stored record kind.
///
/// The store uses this to assign ids, apply patches and validate; the query
/// engine uses it to read fields by name.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Input of a create.
    type Draft: fmt::Debug + DeserializeOwned + Send;

    /// Input of an update. `Default` is the empty patch.
    type Patch: fmt::Debug + Default + DeserializeOwned + Send;

    /// Which collection this record lives in.
    const KIND: EntityKind;

    /// Every field name the record exposes, in camelCase.
    const FIELDS: &'static [&'static str];

    /// Fields consulted by free-text search.
    const SEARCHABLE_FIELDS: &'static [&'static str];

    /// The record's id.
    fn id(&self) -> EntityId;

    /// Build a new record from a draft, applying kind defaults and stamping
    /// creation time.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when the resulting record is invalid.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> Result<Self, ValidationError>;

    /// Build the replacement for `self` with `patch` merged over it.
    ///
    /// Omitted fields are retained, the id never changes and the kind's
    /// last-modified stamp (if any) is set to `now`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when the merged record is invalid.
    fn merged(&self, patch: Self::Patch, now: DateTime<Utc>) -> Result<Self, ValidationError>;

    /// Check field-level constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Recompute derived fields from the stored ones. Applied to records that
    /// enter a store without going through `from_draft`.
    #[must_use]
    fn normalized(self) -> Self {
        self
    }

    /// Read a field by its camelCase name; `None` if the kind has no such
    /// field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Decode a create payload, rejecting unknown fields.
///
/// # Errors
///
/// Returns `ValidationError::MalformedPayload` if the JSON does not match the
/// draft shape.
pub fn parse_draft<R: Record>(json: serde_json::Value) -> Result<R::Draft, ValidationError> {
    serde_json::from_value(json).map_err(|e| ValidationError::MalformedPayload {
        kind: R::KIND,
        reason: e.to_string(),
    })
}

/// Decode an update payload, rejecting unknown fields.
///
/// # Errors
///
/// Returns `ValidationError::MalformedPayload` if the JSON does not match the
/// patch shape.
pub fn parse_patch<R: Record>(json: serde_json::Value) -> Result<R::Patch, ValidationError> {
    serde_json::from_value(json).map_err(|e| ValidationError::MalformedPayload {
        kind: R::KIND,
        reason: e.to_string(),
    })
}

/// Distinguishes an explicit `null` (`Some(None)`) from an omitted field
/// (`None`) in patches.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    Ok(())
}

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn matches_pattern(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

pub(crate) fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    if !matches_pattern(&EMAIL_RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value) {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_phone(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    if !matches_pattern(&PHONE_RE, r"^[\d\s\-+()]+$", value) {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
