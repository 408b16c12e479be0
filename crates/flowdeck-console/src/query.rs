//! Query dispatcher.
//!
//! Turns the filter store into backend search requests, only when the
//! criteria changed since the last dispatch, and keeps the newest result page.

use std::fmt;

use tracing::{debug, warn};

use flowdeck_core::{FilterCriteria, SearchResultPage, WorkflowStatus, PAGE_SIZE};

use crate::criteria::FilterStore;
use crate::error::BackendError;

/// Sort order requested from the backend.
pub const SORT_ORDER: &str = "startTime:DESC";

/// Sequence number of a dispatched search. Later dispatches compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DispatchSeq(u64);

impl fmt::Display for DispatchSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One search to run against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: DispatchSeq,

    /// Structured filter expression; empty when nothing is filtered.
    pub expression: String,

    pub free_text: String,
    pub lookback_hours: Option<u32>,
    pub match_exact: bool,
    pub offset: u64,
}

impl SearchRequest {
    /// Page size to request.
    pub fn size(&self) -> u64 {
        PAGE_SIZE
    }
}

/// Build the structured filter expression for `criteria`.
///
/// Type and status clauses are AND-ed; free text and lookback travel as
/// separate request parameters.
pub fn build_expression(criteria: &FilterCriteria) -> String {
    let mut clauses = Vec::new();

    if !criteria.type_filters.is_empty() {
        let types: Vec<&str> = criteria.type_filters.iter().map(String::as_str).collect();
        clauses.push(format!("workflowType IN ({})", types.join(",")));
    }
    if !criteria.status_filters.is_empty() {
        let statuses: Vec<&str> = criteria
            .status_filters
            .iter()
            .map(WorkflowStatus::as_str)
            .collect();
        clauses.push(format!("status IN ({})", statuses.join(",")));
    }

    clauses.join(" AND ")
}

/// Position of the displayed page within the whole result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub returned: u64,
    pub total: u64,
}

impl PageWindow {
    pub fn has_next_page(&self) -> bool {
        self.offset.saturating_add(PAGE_SIZE) <= self.total
    }

    pub fn has_prev_page(&self) -> bool {
        self.offset >= PAGE_SIZE
    }

    /// End of the displayed range (exclusive).
    pub fn range_end(&self) -> u64 {
        self.offset.saturating_add(self.returned.min(PAGE_SIZE))
    }
}

impl fmt::Display for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.offset, self.range_end())
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    seq: DispatchSeq,
    offset: u64,
}

/// Issues searches and keeps the newest page.
#[derive(Debug, Default)]
pub struct QueryDispatcher {
    last_seq: u64,
    pending: Option<Pending>,
    page: SearchResultPage,
    window: PageWindow,
    last_error: Option<BackendError>,
}

impl QueryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request if the store changed since the last dispatch.
    ///
    /// The dispatched snapshot becomes the store's new baseline, so calling
    /// this again without edits returns `None`.
    pub fn dispatch_if_dirty(&mut self, store: &mut FilterStore) -> Option<SearchRequest> {
        if !store.is_dirty() {
            debug!("Criteria unchanged, skipping search");
            return None;
        }

        let snapshot = store.snapshot();
        let criteria = snapshot.criteria();
        self.last_seq += 1;
        let seq = DispatchSeq(self.last_seq);

        let request = SearchRequest {
            seq,
            expression: build_expression(criteria),
            free_text: criteria.free_text.clone(),
            lookback_hours: criteria.lookback_hours,
            match_exact: criteria.match_exact,
            offset: criteria.page_offset,
        };
        if let Some(superseded) = self.pending.replace(Pending {
            seq,
            offset: request.offset,
        }) {
            debug!(superseded = %superseded.seq, "Superseding in-flight search");
        }
        store.mark_dispatched(snapshot);

        debug!(
            seq = %seq,
            expression = %request.expression,
            free_text = %request.free_text,
            offset = request.offset,
            "Dispatching search"
        );
        Some(request)
    }

    /// Apply a search outcome. Returns false if the outcome was stale.
    ///
    /// A failed search shows as an empty page with no matches; the failure
    /// stays available through [`last_error`](Self::last_error).
    pub fn complete(
        &mut self,
        seq: DispatchSeq,
        result: Result<SearchResultPage, BackendError>,
    ) -> bool {
        let pending = match self.pending {
            Some(pending) if pending.seq == seq => pending,
            _ => {
                debug!(seq = %seq, latest = self.last_seq, "Discarding stale search result");
                return false;
            }
        };
        self.pending = None;

        match result {
            Ok(page) => {
                debug!(
                    seq = %seq,
                    total = page.total_matches,
                    returned = page.returned_count(),
                    "Search completed"
                );
                self.last_error = None;
                self.page = page;
            }
            Err(e) => {
                warn!(seq = %seq, error = %e, "Search failed, showing empty result");
                self.last_error = Some(e);
                self.page = SearchResultPage::default();
            }
        }
        self.window = PageWindow {
            offset: pending.offset,
            returned: self.page.returned_count(),
            total: self.page.total_matches,
        };
        true
    }

    pub fn page(&self) -> &SearchResultPage {
        &self.page
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn last_error(&self) -> Option<&BackendError> {
        self.last_error.as_ref()
    }

    /// True while the newest dispatched search has no outcome yet.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_core::criteria::align_offset;
    use flowdeck_core::ExecutionRecord;

    use crate::criteria::CriteriaUpdate;

    fn records(n: usize) -> Vec<ExecutionRecord> {
        (0..n)
            .map(|i| ExecutionRecord::new(format!("wf-{i}"), "flow", WorkflowStatus::Failed))
            .collect()
    }

    #[test]
    fn test_build_expression() {
        assert_eq!(build_expression(&FilterCriteria::default()), "");

        let criteria = FilterCriteria::default()
            .with_type("shipping")
            .with_type("billing");
        assert_eq!(build_expression(&criteria), "workflowType IN (billing,shipping)");

        let criteria = criteria
            .with_status(WorkflowStatus::Running)
            .with_status(WorkflowStatus::Failed)
            .with_free_text("ignored")
            .with_lookback_hours(3);
        assert_eq!(
            build_expression(&criteria),
            "workflowType IN (billing,shipping) AND status IN (RUNNING,FAILED)"
        );

        let only_status = FilterCriteria::default().with_status(WorkflowStatus::Paused);
        assert_eq!(build_expression(&only_status), "status IN (PAUSED)");
    }

    #[test]
    fn test_dispatch_twice_without_changes_is_noop() {
        let mut store = FilterStore::new(FilterCriteria::default().with_free_text("abc"));
        let mut dispatcher = QueryDispatcher::new();

        let first = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        assert_eq!(first.free_text, "abc");
        assert_eq!(first.size(), 100);
        assert!(!store.is_dirty());
        assert!(dispatcher.dispatch_if_dirty(&mut store).is_none());
        assert!(dispatcher.dispatch_if_dirty(&mut store).is_none());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut store = FilterStore::new(FilterCriteria::default());
        let mut dispatcher = QueryDispatcher::new();

        let first = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        store.next_page();
        let second = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        assert!(second.seq > first.seq);
        assert_eq!(second.offset, 100);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut store = FilterStore::new(FilterCriteria::default());
        let mut dispatcher = QueryDispatcher::new();

        let slow = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        store.set_criteria(CriteriaUpdate::default().free_text("newer"));
        let fast = dispatcher.dispatch_if_dirty(&mut store).unwrap();

        assert!(dispatcher.complete(fast.seq, Ok(SearchResultPage::new(records(2), 2))));
        assert!(!dispatcher.complete(slow.seq, Ok(SearchResultPage::new(records(50), 900))));

        assert_eq!(dispatcher.page().total_matches, 2);
        assert!(!dispatcher.is_loading());
    }

    #[test]
    fn test_duplicate_completion_is_discarded() {
        let mut store = FilterStore::new(FilterCriteria::default());
        let mut dispatcher = QueryDispatcher::new();

        let request = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        assert!(dispatcher.complete(request.seq, Ok(SearchResultPage::new(records(1), 1))));
        assert!(!dispatcher.complete(request.seq, Ok(SearchResultPage::default())));
        assert_eq!(dispatcher.page().returned_count(), 1);
    }

    #[test]
    fn test_failure_shows_empty_page() {
        let mut store = FilterStore::new(FilterCriteria::default());
        let mut dispatcher = QueryDispatcher::new();

        let first = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        dispatcher.complete(first.seq, Ok(SearchResultPage::new(records(3), 3)));

        store.force_dirty();
        let second = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        let error = BackendError::Unavailable("connection refused".to_string());
        assert!(dispatcher.complete(second.seq, Err(error.clone())));

        assert!(dispatcher.page().records.is_empty());
        assert_eq!(dispatcher.window().total, 0);
        assert_eq!(dispatcher.last_error(), Some(&error));
    }

    #[test]
    fn test_first_page_of_failed_filter() {
        let criteria = FilterCriteria::default().with_status(WorkflowStatus::Failed);
        let mut store = FilterStore::new(criteria);
        let mut dispatcher = QueryDispatcher::new();

        let request = dispatcher.dispatch_if_dirty(&mut store).unwrap();
        assert_eq!(request.expression, "status IN (FAILED)");
        dispatcher.complete(request.seq, Ok(SearchResultPage::new(records(100), 250)));

        let window = dispatcher.window();
        assert!(window.has_next_page());
        assert!(!window.has_prev_page());
        assert_eq!(window.to_string(), "0 to 100");
    }

    #[test]
    fn test_last_partial_page() {
        let window = PageWindow {
            offset: 100,
            returned: 50,
            total: 150,
        };
        assert!(!window.has_next_page());
        assert!(window.has_prev_page());
        assert_eq!(window.to_string(), "100 to 150");
    }

    #[test]
    fn test_window_at_largest_offset_does_not_overflow() {
        let window = PageWindow {
            offset: align_offset(u64::MAX),
            returned: 100,
            total: 250,
        };
        assert!(!window.has_next_page());
        assert!(window.has_prev_page());
        assert_eq!(window.range_end(), u64::MAX);
    }

    #[test]
    fn test_exact_boundary_still_offers_next_page() {
        let window = PageWindow {
            offset: 100,
            returned: 100,
            total: 200,
        };
        assert!(window.has_next_page());
    }
}
