//! Tokio driver for a [`WorkflowListSession`].
//!
//! The session stays on one task and is the only writer. Backend calls run on
//! spawned tasks and report back through a channel, so the operator can keep
//! working while a search or bulk job is outstanding; a slow search that
//! returns after a newer one is dropped by sequence number.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use flowdeck_core::{BulkJobStatus, BulkOperation, ExecutionRecord, FilterCriteria};

use crate::error::BulkRejection;
use crate::event::{ConsoleCommand, ConsoleEvent};
use crate::ports::{BulkActions, SearchService, TypeCatalog};
use crate::query::{PageWindow, SearchRequest};
use crate::session::WorkflowListSession;

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Backend collaborators shared with spawned calls.
#[derive(Clone)]
pub struct Backends {
    pub search: Arc<dyn SearchService>,
    pub bulk: Arc<dyn BulkActions>,
    pub types: Arc<dyn TypeCatalog>,
}

impl Backends {
    /// Use one client for every collaborator.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: SearchService + BulkActions + TypeCatalog + 'static,
    {
        Self {
            search: client.clone(),
            bulk: client.clone(),
            types: client,
        }
    }
}

/// Snapshot of everything a renderer needs (no async, no locks).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleView {
    pub criteria: FilterCriteria,
    pub records: Vec<ExecutionRecord>,
    pub window: PageWindow,
    pub loading: bool,

    /// Last search failure; the page is empty while this is set.
    pub search_error: Option<String>,

    pub selected: usize,
    pub bulk_status: BulkJobStatus,
    pub chosen_operation: Option<BulkOperation>,

    /// Why the last Process press did nothing, if it did nothing.
    pub bulk_rejection: Option<BulkRejection>,

    pub workflow_types: Vec<String>,
    pub share_query: String,
}

pub struct ConsoleDriver {
    session: WorkflowListSession,
    backends: Backends,
    view_tx: watch::Sender<ConsoleView>,
    last_rejection: Option<BulkRejection>,
}

impl ConsoleDriver {
    /// Create a driver and the receiver renderers watch.
    pub fn new(
        session: WorkflowListSession,
        backends: Backends,
    ) -> (Self, watch::Receiver<ConsoleView>) {
        let (view_tx, view_rx) = watch::channel(ConsoleView::default());
        let driver = Self {
            session,
            backends,
            view_tx,
            last_rejection: None,
        };
        (driver, view_rx)
    }

    /// Run until [`ConsoleCommand::Quit`] or the command sender is dropped.
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<ConsoleCommand>) -> WorkflowListSession {
        info!("Starting console driver");
        let (events_tx, mut events_rx) = mpsc::channel::<ConsoleEvent>(EVENT_CHANNEL_CAPACITY);

        self.spawn_type_load(&events_tx);
        if let Some(request) = self.session.refresh() {
            self.spawn_search(request, &events_tx);
        }
        self.publish_view();

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        None | Some(ConsoleCommand::Quit) => {
                            info!("Received quit command, shutting down console driver");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd, &events_tx),
                    }
                }
                Some(event) = events_rx.recv() => {
                    self.apply_event(event);
                }
            }
            self.publish_view();
        }

        info!("Console driver shutdown complete");
        self.session
    }

    fn handle_command(&mut self, cmd: ConsoleCommand, events_tx: &mpsc::Sender<ConsoleEvent>) {
        debug!(?cmd, "Handling command");
        let request = match cmd {
            ConsoleCommand::EditFreeText(text) => {
                self.session.edit_free_text(text);
                None
            }
            ConsoleCommand::SubmitFreeText(text) => self.session.submit_free_text(text),
            ConsoleCommand::SetTypeFilters(types) => self.session.set_type_filters(types),
            ConsoleCommand::SetStatusFilters(statuses) => self.session.set_status_filters(statuses),
            ConsoleCommand::SetLookbackHours(raw) => self.session.set_lookback_hours(&raw),
            ConsoleCommand::SetMatchExact(exact) => self.session.set_match_exact(exact),
            ConsoleCommand::NextPage => self.session.next_page(),
            ConsoleCommand::PrevPage => self.session.prev_page(),
            ConsoleCommand::Search => self.session.search_clicked(),
            ConsoleCommand::Navigate(query) => self.session.location_changed(&query),
            ConsoleCommand::ToggleRow { id, selected } => {
                self.session.toggle_row(&id, selected);
                None
            }
            ConsoleCommand::SelectAllVisible => {
                self.session.select_all_visible();
                None
            }
            ConsoleCommand::DeselectAll => {
                self.session.deselect_all();
                None
            }
            ConsoleCommand::ChooseOperation(operation) => {
                self.session.choose_operation(operation);
                None
            }
            ConsoleCommand::ProcessBulk => {
                self.process_bulk(events_tx);
                None
            }
            ConsoleCommand::Quit => None,
        };

        if let Some(request) = request {
            self.spawn_search(request, events_tx);
        }
    }

    fn apply_event(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::SearchCompleted { seq, result } => {
                self.session.search_completed(seq, result);
            }
            ConsoleEvent::BulkCompleted(result) => {
                self.session.bulk_completed(result);
            }
            ConsoleEvent::TypesLoaded(Ok(types)) => {
                debug!(count = types.len(), "Loaded workflow types");
                self.session.load_types(types);
            }
            ConsoleEvent::TypesLoaded(Err(e)) => {
                warn!(error = %e, "Failed to load workflow types");
            }
        }
    }

    fn process_bulk(&mut self, events_tx: &mpsc::Sender<ConsoleEvent>) {
        match self.session.process_bulk() {
            Ok(ticket) => {
                self.last_rejection = None;
                let bulk = Arc::clone(&self.backends.bulk);
                let tx = events_tx.clone();
                tokio::spawn(async move {
                    let result = bulk.apply(ticket.operation, &ticket.target_ids).await;
                    let _ = tx.send(ConsoleEvent::BulkCompleted(result)).await;
                });
            }
            Err(rejection) => {
                debug!(%rejection, "Bulk submission rejected");
                self.last_rejection = Some(rejection);
            }
        }
    }

    fn spawn_search(&self, request: SearchRequest, events_tx: &mpsc::Sender<ConsoleEvent>) {
        let search = Arc::clone(&self.backends.search);
        let tx = events_tx.clone();
        tokio::spawn(async move {
            let seq = request.seq;
            let result = search.search(&request).await;
            let _ = tx.send(ConsoleEvent::SearchCompleted { seq, result }).await;
        });
    }

    fn spawn_type_load(&self, events_tx: &mpsc::Sender<ConsoleEvent>) {
        let types = Arc::clone(&self.backends.types);
        let tx = events_tx.clone();
        tokio::spawn(async move {
            let result = types.workflow_types().await;
            let _ = tx.send(ConsoleEvent::TypesLoaded(result)).await;
        });
    }

    fn publish_view(&self) {
        let session = &self.session;
        self.view_tx.send_replace(ConsoleView {
            criteria: session.criteria().clone(),
            records: session.page().records.clone(),
            window: session.window(),
            loading: session.is_loading(),
            search_error: session.last_error().map(|e| e.to_string()),
            selected: session.selection().len(),
            bulk_status: session.bulk_status(),
            chosen_operation: session.chosen_operation(),
            bulk_rejection: self.last_rejection,
            workflow_types: session.workflow_types().to_vec(),
            share_query: session.shareable_query(),
        });
    }
}
