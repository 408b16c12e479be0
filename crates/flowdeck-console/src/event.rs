//! Messages flowing into a running console.

use flowdeck_core::{BulkOperation, SearchResultPage, WorkflowId, WorkflowStatus};

use crate::error::BackendError;
use crate::query::DispatchSeq;

/// Completions sent from spawned backend calls to the driver.
#[derive(Debug)]
pub enum ConsoleEvent {
    /// A search finished (possibly superseded by a newer one).
    SearchCompleted {
        seq: DispatchSeq,
        result: Result<SearchResultPage, BackendError>,
    },

    /// The backend answered a bulk submission.
    BulkCompleted(Result<(), BackendError>),

    /// The type catalog was fetched.
    TypesLoaded(Result<Vec<String>, BackendError>),
}

/// Operator input sent from the renderer to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Keystroke in the search box.
    EditFreeText(String),

    /// Enter pressed in the search box.
    SubmitFreeText(String),

    SetTypeFilters(Vec<String>),

    SetStatusFilters(Vec<WorkflowStatus>),

    /// Lookback hours as typed.
    SetLookbackHours(String),

    SetMatchExact(bool),

    NextPage,

    PrevPage,

    /// Explicit search button.
    Search,

    /// Host navigated to a new location query.
    Navigate(String),

    ToggleRow { id: WorkflowId, selected: bool },

    SelectAllVisible,

    DeselectAll,

    ChooseOperation(Option<BulkOperation>),

    /// Process button for the chosen bulk operation.
    ProcessBulk,

    /// Stop the driver.
    Quit,
}
