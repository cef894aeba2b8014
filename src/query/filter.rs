//! Search and field-equality filtering.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::model::Record;

/// Lowercased search needle, or `None` when the text is empty or blank.
pub(crate) fn normalize_search(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// True when any searchable field contains `needle` (already lowercase).
pub(crate) fn matches_search<R: Record>(record: &R, needle: &str) -> bool {
    R::SEARCHABLE_FIELDS
        .iter()
        .filter_map(|name| record.field(name))
        .any(|value| value.contains_lowercase(needle))
}

/// Filters that actually constrain the result, i.e. not set to the sentinel.
///
/// Unknown field names are rejected even when their value is the sentinel.
pub(crate) fn active_filters<'a, R: Record>(
    filters: &'a BTreeMap<String, String>,
    all_sentinel: &str,
) -> Result<Vec<(&'a str, &'a str)>, ValidationError> {
    let mut active = Vec::with_capacity(filters.len());
    for (field, value) in filters {
        if !R::FIELDS.contains(&field.as_str()) {
            return Err(ValidationError::UnknownFilterField {
                kind: R::KIND,
                field: field.clone(),
            });
        }
        if value != all_sentinel {
            active.push((field.as_str(), value.as_str()));
        }
    }
    Ok(active)
}

/// True when the record equals every active filter.
pub(crate) fn matches_filters<R: Record>(record: &R, filters: &[(&str, &str)]) -> bool {
    filters.iter().all(|(field, expected)| {
        record
            .field(field)
            .is_some_and(|value| value.equals_filter(expected))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, Utc};

    use crate::entity::{EntityId, EntityKind};
    use crate::model::{Deal, DealDraft, DealStage};

    fn deal(stage: DealStage) -> Deal {
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        Deal::from_draft(
            EntityId::new(1),
            DealDraft::new("Expansion", "Umbrella Corp", "Alice Wong", 900.0, due).stage(stage),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn blank_search_is_no_search() {
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
        assert_eq!(normalize_search(Some(" Umbrella ")), Some("umbrella".to_string()));
    }

    #[test]
    fn search_hits_any_searchable_field() {
        let d = deal(DealStage::Lead);
        assert!(matches_search(&d, "umbrella"));
        assert!(matches_search(&d, "wong"));
        assert!(!matches_search(&d, "900"));
    }

    #[test]
    fn sentinel_filters_are_dropped() {
        let mut filters = BTreeMap::new();
        filters.insert("stage".to_string(), "all".to_string());
        filters.insert("company".to_string(), "Umbrella Corp".to_string());
        let active = active_filters::<Deal>(&filters, "all").unwrap();
        assert_eq!(active, vec![("company", "Umbrella Corp")]);
    }

    #[test]
    fn unknown_filter_field_is_invalid() {
        let mut filters = BTreeMap::new();
        filters.insert("colour".to_string(), "all".to_string());
        let err = active_filters::<Deal>(&filters, "all").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownFilterField {
                kind: EntityKind::Deal,
                field: "colour".to_string()
            }
        );
    }

    #[test]
    fn every_filter_must_match() {
        let d = deal(DealStage::Proposal);
        assert!(matches_filters(&d, &[("stage", "Proposal"), ("company", "Umbrella Corp")]));
        assert!(!matches_filters(&d, &[("stage", "Proposal"), ("company", "Initech")]));
    }
}
