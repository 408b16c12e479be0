//! Filter state store.
//!
//! Holds the criteria being edited and the snapshot of the criteria last sent
//! to the backend. Dirtiness is a comparison of two immutable values, never a
//! flag flipped in place.

use std::collections::BTreeSet;

use tracing::debug;

use flowdeck_core::criteria::align_offset;
use flowdeck_core::{FilterCriteria, WorkflowStatus, PAGE_SIZE};

/// Partial update merged into the current criteria.
///
/// `None` leaves a field untouched. `lookback_hours` is doubly optional so an
/// update can clear the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaUpdate {
    pub free_text: Option<String>,
    pub type_filters: Option<BTreeSet<String>>,
    pub status_filters: Option<BTreeSet<WorkflowStatus>>,
    pub lookback_hours: Option<Option<u32>>,
    pub match_exact: Option<bool>,
    pub page_offset: Option<u64>,
}

impl CriteriaUpdate {
    pub fn free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    /// Type names are trimmed; blanks are dropped and comma-joined names are
    /// split, matching how deep links read them.
    pub fn type_filters<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = types
            .into_iter()
            .map(Into::into)
            .flat_map(|name: String| {
                name.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        self.type_filters = Some(names);
        self
    }

    pub fn status_filters(mut self, statuses: impl IntoIterator<Item = WorkflowStatus>) -> Self {
        self.status_filters = Some(statuses.into_iter().collect());
        self
    }

    pub fn lookback_hours(mut self, hours: Option<u32>) -> Self {
        self.lookback_hours = Some(hours);
        self
    }

    pub fn match_exact(mut self, exact: bool) -> Self {
        self.match_exact = Some(exact);
        self
    }

    pub fn page_offset(mut self, offset: u64) -> Self {
        self.page_offset = Some(offset);
        self
    }
}

/// Immutable copy of the criteria at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CriteriaSnapshot(FilterCriteria);

impl CriteriaSnapshot {
    pub fn criteria(&self) -> &FilterCriteria {
        &self.0
    }
}

/// The single mutable criteria of one execution list view.
#[derive(Debug, Clone)]
pub struct FilterStore {
    current: FilterCriteria,
    dispatched: Option<CriteriaSnapshot>,
}

impl FilterStore {
    /// Create a store seeded from deep-link criteria.
    ///
    /// Nothing has been dispatched yet, so the store starts dirty.
    pub fn new(mut criteria: FilterCriteria) -> Self {
        criteria.page_offset = align_offset(criteria.page_offset);
        Self {
            current: criteria,
            dispatched: None,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.current
    }

    /// Merge a partial update. Returns true if the criteria changed.
    ///
    /// Any effective change to a field other than the offset sends the view
    /// back to the first page, even if the update carried an offset too.
    pub fn set_criteria(&mut self, update: CriteriaUpdate) -> bool {
        let mut next = self.current.clone();
        let mut filters_changed = false;

        if let Some(text) = update.free_text {
            filters_changed |= text != next.free_text;
            next.free_text = text;
        }
        if let Some(types) = update.type_filters {
            filters_changed |= types != next.type_filters;
            next.type_filters = types;
        }
        if let Some(statuses) = update.status_filters {
            filters_changed |= statuses != next.status_filters;
            next.status_filters = statuses;
        }
        if let Some(hours) = update.lookback_hours {
            filters_changed |= hours != next.lookback_hours;
            next.lookback_hours = hours;
        }
        if let Some(exact) = update.match_exact {
            filters_changed |= exact != next.match_exact;
            next.match_exact = exact;
        }
        if let Some(offset) = update.page_offset {
            next.page_offset = align_offset(offset);
        }

        let changed = next != self.current;
        self.current = next;
        if filters_changed {
            self.reset_pagination();
        }
        changed
    }

    /// Replace the criteria wholesale, as when navigating history.
    pub fn replace(&mut self, mut criteria: FilterCriteria) -> bool {
        criteria.page_offset = align_offset(criteria.page_offset);
        let changed = criteria != self.current;
        self.current = criteria;
        changed
    }

    /// Return to the first page.
    pub fn reset_pagination(&mut self) {
        if self.current.page_offset != 0 {
            debug!(from = self.current.page_offset, "Resetting pagination");
        }
        self.current.page_offset = 0;
    }

    /// Advance one page.
    pub fn next_page(&mut self) {
        let next = self.current.page_offset.saturating_add(PAGE_SIZE);
        self.current.page_offset = align_offset(next);
    }

    /// Go back one page, stopping at the first.
    pub fn prev_page(&mut self) {
        self.current.page_offset = self.current.page_offset.saturating_sub(PAGE_SIZE);
    }

    pub fn snapshot(&self) -> CriteriaSnapshot {
        CriteriaSnapshot(self.current.clone())
    }

    pub fn last_dispatched(&self) -> Option<&CriteriaSnapshot> {
        self.dispatched.as_ref()
    }

    /// True if the criteria differ from what was last dispatched.
    pub fn is_dirty(&self) -> bool {
        self.dispatched
            .as_ref()
            .map_or(true, |baseline| baseline.criteria() != &self.current)
    }

    /// Record `snapshot` as the baseline for later dirtiness checks.
    pub fn mark_dispatched(&mut self, snapshot: CriteriaSnapshot) {
        self.dispatched = Some(snapshot);
    }

    /// Forget the baseline so the next dispatch fires even without changes.
    pub fn force_dirty(&mut self) {
        self.dispatched = None;
    }
}
