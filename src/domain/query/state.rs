use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::domain::model::EntitySchema;

/// Filter value meaning "no constraint on this dimension".
pub const ALL: &str = "all";

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    All,
    Only(String),
}

impl FilterValue {
    /// `"all"` (any case) and blank input map to [`FilterValue::All`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            FilterValue::All
        } else {
            FilterValue::Only(trimmed.to_string())
        }
    }

    pub fn as_constraint(&self) -> Option<&str> {
        match self {
            FilterValue::All => None,
            FilterValue::Only(v) => Some(v),
        }
    }
}

/// Filter, sort and page state of one list view.
///
/// Every mutator that changes what matches (search, filter, sort) puts the
/// view back on page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    search_term: String,
    filters: BTreeMap<String, FilterValue>,
    sort: SortSpec,
    current_page: usize,
    page_size: usize,
}

impl ListState {
    pub fn new(schema: &dyn EntitySchema) -> Self {
        Self {
            search_term: String::new(),
            filters: schema
                .filter_dimensions()
                .iter()
                .map(|d| (d.to_string(), FilterValue::All))
                .collect(),
            sort: schema.default_sort(),
            current_page: 1,
            page_size: schema.page_size().max(1),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterValue> {
        &self.filters
    }

    /// Dimensions constrained to a concrete value.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter_map(|(dim, v)| v.as_constraint().map(|value| (dim.as_str(), value)))
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the first row of the current page.
    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    pub fn set_filter(&mut self, dimension: &str, value: FilterValue) {
        self.filters.insert(dimension.to_string(), value);
        self.current_page = 1;
    }

    /// Toggles direction on the active field; a new field starts ascending.
    pub fn set_sort(&mut self, field: &str) {
        if self.sort.field == field {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = SortSpec::new(field, SortDirection::Asc);
        }
        self.current_page = 1;
    }

    /// Moves to `page` when it lies in `1..=total_pages`; otherwise does nothing.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> bool {
        if page < 1 || page > total_pages || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub(crate) fn reset_page(&mut self) {
        self.current_page = 1;
    }

    /// Pulls the current page back into `1..=total_pages`.
    pub(crate) fn clamp_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }
}

/// `ceil(match_count / page_size)`, never less than 1.
pub fn total_pages(match_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    match_count.div_ceil(page_size).max(1)
}
