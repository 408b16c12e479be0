//! Search criteria an operator filters executions by.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::status::WorkflowStatus;

/// Fixed number of records per result page.
pub const PAGE_SIZE: u64 = 100;

/// The complete set of search criteria for one execution list view.
///
/// Filter sets are ordered so two criteria built in different orders compare
/// (and serialize) identically. `page_offset` is always a multiple of
/// [`PAGE_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Unstructured text matched against indexed execution fields.
    pub free_text: String,

    /// Workflow type names; empty means any type.
    pub type_filters: BTreeSet<String>,

    /// Execution statuses; empty means any status.
    pub status_filters: BTreeSet<WorkflowStatus>,

    /// Only executions created within the last N hours.
    pub lookback_hours: Option<u32>,

    /// Match the free text as one exact phrase.
    pub match_exact: bool,

    /// Index of the first record of the current page.
    pub page_offset: u64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            free_text: String::new(),
            type_filters: BTreeSet::new(),
            status_filters: BTreeSet::new(),
            lookback_hours: None,
            match_exact: true,
            page_offset: 0,
        }
    }
}

impl FilterCriteria {
    /// Builder method to set the free text.
    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = text.into();
        self
    }

    /// Builder method to add a workflow type filter.
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.type_filters.insert(name.into());
        self
    }

    /// Builder method to add a status filter.
    pub fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.status_filters.insert(status);
        self
    }

    /// Builder method to set the lookback window.
    pub fn with_lookback_hours(mut self, hours: u32) -> Self {
        self.lookback_hours = Some(hours);
        self
    }

    /// Builder method to set the page offset (aligned down to a page boundary).
    pub fn with_page_offset(mut self, offset: u64) -> Self {
        self.page_offset = align_offset(offset);
        self
    }
}

/// Round an offset down to the start of its page.
pub fn align_offset(offset: u64) -> u64 {
    offset - offset % PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = FilterCriteria::default()
            .with_type("billing")
            .with_type("shipping")
            .with_status(WorkflowStatus::Failed)
            .with_status(WorkflowStatus::Running);
        let b = FilterCriteria::default()
            .with_status(WorkflowStatus::Running)
            .with_type("shipping")
            .with_status(WorkflowStatus::Failed)
            .with_type("billing");
        assert_eq!(a, b);
    }

    #[test]
    fn test_offset_is_aligned() {
        assert_eq!(align_offset(0), 0);
        assert_eq!(align_offset(99), 0);
        assert_eq!(align_offset(250), 200);
        assert_eq!(FilterCriteria::default().with_page_offset(130).page_offset, 100);
    }

    #[test]
    fn test_default_matches_exact_phrase() {
        let criteria = FilterCriteria::default();
        assert!(criteria.match_exact);
        assert!(criteria.free_text.is_empty());
        assert_eq!(criteria.lookback_hours, None);
        assert_eq!(criteria.with_lookback_hours(4).lookback_hours, Some(4));
    }
}
