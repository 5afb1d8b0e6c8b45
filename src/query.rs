use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::filter;
use crate::models::{FilterSet, PageRequest, PageResult, Record, RecordSchema, SortSpec};
use crate::page;
use crate::sort;

/// The control state of one analysis table: active filters, sort order, and
/// page position, typically mirroring a page's search box, sliders,
/// dropdowns, and column headers.
///
/// Changing filters or sort invalidates the current page, so those mutators
/// snap the page position back to 1 the way the product's tables do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryState {
    #[serde(default)]
    pub filters: FilterSet,
    #[serde(default)]
    pub sort: SortSpec,
    #[serde(default)]
    pub page: PageRequest,
}

impl QueryState {
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.page.page_number = 1;
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.sort.toggle(field);
        self.page.page_number = 1;
    }

    pub fn set_page(&mut self, page_number: usize) {
        self.page.page_number = page_number;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page.page_size = page_size;
        self.page.page_number = 1;
    }

    /// Runs filter, sort, and paginate over a record snapshot. The input is
    /// never mutated; each call recomputes from scratch.
    pub fn execute(
        &self,
        records: &[Record],
        schema: &RecordSchema,
    ) -> Result<PageResult<Record>, EngineError> {
        let filtered = filter::apply_filters(records, &self.filters, schema)?;
        let sorted = sort::apply_sort(&filtered, &self.sort, schema)?;
        page::paginate(&sorted, &self.page)
    }
}
