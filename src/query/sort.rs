//! Stable, type-aware sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The other direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Apply this direction to an ascending comparison.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Sort key: a field name plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Column-header behaviour: selecting the current field flips the
    /// direction, selecting another field sorts it ascending.
    #[must_use]
    pub fn toggled(&self, field: &str) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::asc(field)
        }
    }
}

/// Sort `records` in place by `spec`.
///
/// The sort is stable, so ties keep their incoming order in both
/// directions. A field the record kind does not define leaves the order
/// untouched.
pub(crate) fn sort_records<R: Record>(records: &mut Vec<&R>, spec: &SortSpec) {
    if !R::FIELDS.contains(&spec.field.as_str()) {
        debug!(
            component = "query",
            op = "sort",
            kind = %R::KIND,
            field = %spec.field,
            "unknown sort field, keeping order"
        );
        return;
    }

    let mut keyed: Vec<_> = records
        .drain(..)
        .map(|r| (r.field(&spec.field).unwrap_or_default(), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| spec.direction.apply(a.compare(b)));
    records.extend(keyed.into_iter().map(|(_, r)| r));
}
