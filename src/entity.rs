//! Entity identity and kinds.
//!
//! Every record in a collection is anchored by a positive integer id that is
//! assigned once, at creation, and never changes or gets reused.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, positive record identifier.
///
/// # Examples
///
/// ```
/// use crm_engine::EntityId;
///
/// let id = EntityId::new(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(id.next(), EntityId::new(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Ids start at 1; zero is never assigned.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// The four record kinds held by the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A person the team talks to.
    Contact,
    /// An organisation contacts belong to.
    Company,
    /// A sales opportunity moving through the pipeline.
    Deal,
    /// A follow-up item.
    Task,
}

impl EntityKind {
    /// All kinds, in dashboard order.
    pub const ALL: [Self; 4] = [Self::Contact, Self::Company, Self::Deal, Self::Task];

    /// Lowercase singular name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Company => "company",
            Self::Deal => "deal",
            Self::Task => "task",
        }
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| value.eq_ignore_ascii_case(kind.as_str()))
            .ok_or_else(|| {
                format!("unknown entity kind: {value}. Use one of contact, company, deal, task")
            })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
