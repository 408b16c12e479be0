//! Selection tracker for multi-select rows.

use std::collections::BTreeSet;

use flowdeck_core::{ExecutionRecord, WorkflowId};

/// Ids of the checked executions.
///
/// Membership is by id, so toggling the same record twice never duplicates
/// it. Refreshing the page does not touch the selection; only explicit calls
/// (or a finished bulk job) clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<WorkflowId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck one execution. Returns true if membership changed.
    pub fn toggle(&mut self, id: &WorkflowId, selected: bool) -> bool {
        if selected {
            self.ids.insert(id.clone())
        } else {
            self.ids.remove(id)
        }
    }

    /// Check or uncheck the execution behind a rendered row.
    pub fn toggle_record(&mut self, record: &ExecutionRecord, selected: bool) -> bool {
        self.toggle(&record.workflow_id, selected)
    }

    /// Replace the selection with exactly `ids`.
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = WorkflowId>,
    {
        self.ids = ids.into_iter().collect();
    }

    pub fn deselect_all(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &WorkflowId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in sorted order.
    pub fn ids(&self) -> Vec<WorkflowId> {
        self.ids.iter().cloned().collect()
    }
}
