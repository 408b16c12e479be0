//! One execution list view: filter store, location, dispatcher, selection
//! and bulk orchestrator wired together behind the view's event handlers.
//!
//! Handlers that may trigger a search return the [`SearchRequest`] to run;
//! the caller executes it and reports back through
//! [`search_completed`](WorkflowListSession::search_completed).

use tracing::debug;

use flowdeck_core::{
    BulkJobStatus, BulkOperation, FilterCriteria, SearchResultPage, WorkflowId, WorkflowStatus,
};

use crate::bulk::{BulkJob, BulkOrchestrator, BulkTicket};
use crate::criteria::{CriteriaUpdate, FilterStore};
use crate::error::{BackendError, BulkRejection};
use crate::location::{self, LocationSynchronizer};
use crate::ports::{BulkActions, Navigator, SearchService, TypeCatalog};
use crate::query::{DispatchSeq, PageWindow, QueryDispatcher, SearchRequest};
use crate::selection::Selection;

pub struct WorkflowListSession {
    store: FilterStore,
    location: LocationSynchronizer,
    dispatcher: QueryDispatcher,
    selection: Selection,
    bulk: BulkOrchestrator,
    workflow_types: Vec<String>,
}

impl WorkflowListSession {
    /// Start a view from explicit criteria. Nothing is published until the
    /// first dispatch.
    pub fn new(criteria: FilterCriteria, navigator: Box<dyn Navigator>) -> Self {
        Self {
            store: FilterStore::new(criteria),
            location: LocationSynchronizer::new(navigator),
            dispatcher: QueryDispatcher::new(),
            selection: Selection::new(),
            bulk: BulkOrchestrator::new(),
            workflow_types: Vec::new(),
        }
    }

    /// Start a view from a deep link.
    pub fn open(query: &str, navigator: Box<dyn Navigator>) -> Self {
        let mut location = LocationSynchronizer::new(navigator);
        let criteria = location.restore(query);
        debug!(query = %query, "Opening execution list");
        Self {
            store: FilterStore::new(criteria),
            location,
            dispatcher: QueryDispatcher::new(),
            selection: Selection::new(),
            bulk: BulkOrchestrator::new(),
            workflow_types: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Read side
    // ---------------------------------------------------------------------

    pub fn criteria(&self) -> &FilterCriteria {
        self.store.criteria()
    }

    pub fn page(&self) -> &SearchResultPage {
        self.dispatcher.page()
    }

    pub fn window(&self) -> PageWindow {
        self.dispatcher.window()
    }

    pub fn last_error(&self) -> Option<&BackendError> {
        self.dispatcher.last_error()
    }

    pub fn is_loading(&self) -> bool {
        self.dispatcher.is_loading()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn bulk_status(&self) -> BulkJobStatus {
        self.bulk.status()
    }

    pub fn bulk_job(&self) -> Option<&BulkJob> {
        self.bulk.job()
    }

    pub fn chosen_operation(&self) -> Option<BulkOperation> {
        self.bulk.chosen()
    }

    /// Query string for the criteria last shown in the location.
    pub fn shareable_query(&self) -> String {
        self.location
            .current()
            .map(str::to_string)
            .unwrap_or_else(|| location::serialize(self.store.criteria()))
    }

    pub fn workflow_types(&self) -> &[String] {
        &self.workflow_types
    }

    /// Known type names containing `fragment`, minus those already filtered on.
    pub fn type_suggestions(&self, fragment: &str) -> Vec<&str> {
        let fragment = fragment.to_lowercase();
        self.workflow_types
            .iter()
            .filter(|name| !self.store.criteria().type_filters.contains(*name))
            .filter(|name| name.to_lowercase().contains(&fragment))
            .map(String::as_str)
            .collect()
    }

    /// Statuses not yet filtered on.
    pub fn status_suggestions(&self) -> Vec<WorkflowStatus> {
        WorkflowStatus::ALL
            .into_iter()
            .filter(|status| !self.store.criteria().status_filters.contains(status))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Search side
    // ---------------------------------------------------------------------

    /// Dispatch if the criteria changed, publishing the location first.
    pub fn refresh(&mut self) -> Option<SearchRequest> {
        let request = self.dispatcher.dispatch_if_dirty(&mut self.store)?;
        self.location.publish(self.store.criteria());
        Some(request)
    }

    fn update(&mut self, update: CriteriaUpdate) -> Option<SearchRequest> {
        self.store.set_criteria(update);
        self.refresh()
    }

    /// Keystroke in the search box; searching waits for submit.
    pub fn edit_free_text(&mut self, text: impl Into<String>) {
        self.store.set_criteria(CriteriaUpdate::default().free_text(text));
    }

    /// Enter pressed in the search box.
    pub fn submit_free_text(&mut self, text: impl Into<String>) -> Option<SearchRequest> {
        self.update(CriteriaUpdate::default().free_text(text))
    }

    pub fn set_type_filters<I, S>(&mut self, types: I) -> Option<SearchRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(CriteriaUpdate::default().type_filters(types))
    }

    pub fn set_status_filters(
        &mut self,
        statuses: impl IntoIterator<Item = WorkflowStatus>,
    ) -> Option<SearchRequest> {
        self.update(CriteriaUpdate::default().status_filters(statuses))
    }

    /// Lookback hours as typed; anything that is not a whole number clears
    /// the window.
    pub fn set_lookback_hours(&mut self, raw: &str) -> Option<SearchRequest> {
        let raw = raw.trim();
        let hours = if raw.is_empty() {
            None
        } else {
            raw.parse::<u32>()
                .map_err(|e| debug!(value = %raw, error = %e, "Ignoring malformed lookback"))
                .ok()
        };
        self.update(CriteriaUpdate::default().lookback_hours(hours))
    }

    pub fn set_match_exact(&mut self, exact: bool) -> Option<SearchRequest> {
        self.update(CriteriaUpdate::default().match_exact(exact))
    }

    pub fn next_page(&mut self) -> Option<SearchRequest> {
        self.store.next_page();
        self.refresh()
    }

    pub fn prev_page(&mut self) -> Option<SearchRequest> {
        self.store.prev_page();
        self.refresh()
    }

    /// Explicit search button: always searches, even without changes.
    pub fn search_clicked(&mut self) -> Option<SearchRequest> {
        self.store.force_dirty();
        self.refresh()
    }

    /// The host navigated (back/forward or a pasted link).
    pub fn location_changed(&mut self, query: &str) -> Option<SearchRequest> {
        let criteria = self.location.restore(query);
        if self.store.replace(criteria) {
            debug!(query = %query, "Criteria restored from location");
        }
        self.refresh()
    }

    /// Apply a search outcome. Returns false if it was stale.
    pub fn search_completed(
        &mut self,
        seq: DispatchSeq,
        result: Result<SearchResultPage, BackendError>,
    ) -> bool {
        self.dispatcher.complete(seq, result)
    }

    /// Run `request` against `search` and apply the outcome.
    pub async fn execute_search(
        &mut self,
        request: SearchRequest,
        search: &dyn SearchService,
    ) -> bool {
        let result = search.search(&request).await;
        self.search_completed(request.seq, result)
    }

    /// Cache the known workflow type names for suggestions.
    pub fn load_types(&mut self, mut types: Vec<String>) {
        types.sort();
        types.dedup();
        self.workflow_types = types;
    }

    pub async fn load_types_from(&mut self, catalog: &dyn TypeCatalog) -> Result<(), BackendError> {
        let types = catalog.workflow_types().await?;
        self.load_types(types);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Selection and bulk side
    // ---------------------------------------------------------------------

    pub fn toggle_row(&mut self, id: &WorkflowId, selected: bool) -> bool {
        self.selection.toggle(id, selected)
    }

    /// Check every row of the current page.
    pub fn select_all_visible(&mut self) {
        let ids: Vec<WorkflowId> = self.dispatcher.page().ids().cloned().collect();
        self.selection.select_all(ids);
    }

    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = WorkflowId>,
    {
        self.selection.select_all(ids);
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all();
    }

    pub fn choose_operation(&mut self, operation: Option<BulkOperation>) {
        self.bulk.choose(operation);
    }

    /// Process button: start a bulk job for the chosen operation.
    pub fn process_bulk(&mut self) -> Result<BulkTicket, BulkRejection> {
        self.bulk.submit(&self.selection)
    }

    pub fn bulk_completed(&mut self, result: Result<(), BackendError>) -> BulkJobStatus {
        self.bulk.acknowledge(result, &mut self.selection)
    }

    /// Submit the chosen operation and wait for the acknowledgement.
    pub async fn run_bulk(
        &mut self,
        actions: &dyn BulkActions,
    ) -> Result<BulkJobStatus, BulkRejection> {
        self.bulk.execute(&mut self.selection, actions).await
    }
}
