//! Search, filter, sort and paginate a snapshot of records.
//!
//! The engine is pure: it reads a slice and returns a [`Page`] of clones,
//! never touching the store it came from. Steps run in a fixed order:
//! search, then equality filters, then a stable sort, then the page slice.
//! `total_count` is taken after filtering and before slicing.

mod filter;
mod pagination;
mod sort;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::QueryConfig;
use crate::error::{CrmResult, ValidationError};
use crate::model::Record;

pub use pagination::{clamp_page, total_pages, visible_pages};
pub use sort::{SortDirection, SortSpec};

/// Records per page when the caller does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Filter value meaning "no constraint on this field".
pub const ALL_SENTINEL: &str = "all";

/// Parameters of a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct QueryParams {
    pub search_text: Option<String>,
    pub filters: BTreeMap<String, String>,
    pub sort: Option<SortSpec>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search_text: None,
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    #[must_use]
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Reject a zero page or page size.
    ///
    /// # Errors
    ///
    /// Returns `ZeroPage` or `ZeroPageSize`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::ZeroPage);
        }
        if self.page_size == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        Ok(())
    }
}

/// Fluent builder for [`QueryParams`].
///
/// # Example
///
/// ```
/// use crm_engine::query::{QueryParams, SortDirection};
///
/// let params = QueryParams::builder()
///     .search("acme")
///     .filter("stage", "Proposal")
///     .sort_by("value", SortDirection::Desc)
///     .page(2)
///     .build()
///     .unwrap();
/// assert_eq!(params.page, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: QueryParams,
}

impl QueryBuilder {
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.params.search_text = Some(text.into());
        self
    }

    /// Require `field` to equal `value`. Passing the sentinel (`"all"`)
    /// leaves the field unconstrained.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.filters.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.params.sort = Some(SortSpec::new(field, direction));
        self
    }

    #[must_use]
    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.params.sort = Some(spec);
        self
    }

    #[must_use]
    pub fn page(mut self, page: usize) -> Self {
        self.params.page = page;
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.params.page_size = page_size;
        self
    }

    /// Finish the builder.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a zero page or page size.
    pub fn build(self) -> Result<QueryParams, ValidationError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Matches after filtering, before slicing.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<R> Page<R> {
    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.page_size)
    }

    /// 1-based numbers of the first and last item on this page, as shown
    /// in "Showing 51 to 100 of 240". `None` for an empty page.
    #[must_use]
    pub fn item_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let start = self.page.saturating_sub(1) * self.page_size + 1;
        Some((start, start + self.items.len() - 1))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    #[must_use]
    pub fn visible_pages(&self, max_visible: usize) -> Vec<usize> {
        visible_pages(self.page, self.total_pages(), max_visible)
    }
}

/// Executes [`QueryParams`] against record snapshots.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    all_sentinel: String,
    default_page_size: usize,
    max_visible_pages: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

impl QueryEngine {
    #[must_use]
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            all_sentinel: config.all_sentinel.clone(),
            default_page_size: config.default_page_size,
            max_visible_pages: config.max_visible_pages,
        }
    }

    /// A builder preloaded with this engine's default page size.
    #[must_use]
    pub fn params(&self) -> QueryBuilder {
        QueryParams::builder().page_size(self.default_page_size)
    }

    pub fn max_visible_pages(&self) -> usize {
        self.max_visible_pages
    }

    /// Run `params` over `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero page or page size, or a filter
    /// on a field `R` does not define.
    pub fn query<R: Record>(&self, snapshot: &[R], params: &QueryParams) -> CrmResult<Page<R>> {
        params.validate()?;
        let filters = filter::active_filters::<R>(&params.filters, &self.all_sentinel)?;
        let needle = filter::normalize_search(params.search_text.as_deref());

        let mut matched: Vec<&R> = snapshot
            .iter()
            .filter(|r| needle.as_deref().map_or(true, |n| filter::matches_search(*r, n)))
            .filter(|r| filter::matches_filters(*r, &filters))
            .collect();
        let total_count = matched.len();

        if let Some(spec) = &params.sort {
            sort::sort_records(&mut matched, spec);
        }

        let bounds = pagination::page_bounds(total_count, params.page, params.page_size);
        let items: Vec<R> = matched[bounds].iter().map(|r| (*r).clone()).collect();

        debug!(
            component = "query",
            op = "query",
            kind = %R::KIND,
            scanned = snapshot.len(),
            total_count,
            page = params.page,
            page_size = params.page_size,
            returned = items.len(),
            "query executed"
        );

        Ok(Page {
            items,
            total_count,
            page: params.page,
            page_size: params.page_size,
        })
    }
}

/// Every record whose searchable fields contain `text`, case-insensitively.
/// Blank text returns the whole snapshot.
pub fn search<R: Record>(snapshot: &[R], text: &str) -> Vec<R> {
    match filter::normalize_search(Some(text)) {
        Some(needle) => snapshot
            .iter()
            .filter(|r| filter::matches_search(*r, &needle))
            .cloned()
            .collect(),
        None => snapshot.to_vec(),
    }
}
