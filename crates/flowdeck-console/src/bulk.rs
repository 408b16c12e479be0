//! Bulk operation orchestrator.
//!
//! State machine: `Idle -> InFlight -> Succeeded | Failed`. A finished job
//! stays visible until the next submission replaces it. At most one job is in
//! flight.

use tracing::{info, warn};

use flowdeck_core::{BulkJobStatus, BulkOperation, WorkflowId};

use crate::error::{BackendError, BulkRejection};
use crate::ports::BulkActions;
use crate::selection::Selection;

/// The most recent bulk submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkJob {
    pub operation: BulkOperation,
    pub target_ids: Vec<WorkflowId>,
    pub status: BulkJobStatus,
}

/// What to send to the backend for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTicket {
    pub operation: BulkOperation,
    pub target_ids: Vec<WorkflowId>,
}

#[derive(Debug, Default)]
pub struct BulkOrchestrator {
    chosen: Option<BulkOperation>,
    job: Option<BulkJob>,
}

impl BulkOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick (or clear) the operation the next submission applies.
    pub fn choose(&mut self, operation: Option<BulkOperation>) {
        self.chosen = operation;
    }

    pub fn chosen(&self) -> Option<BulkOperation> {
        self.chosen
    }

    pub fn job(&self) -> Option<&BulkJob> {
        self.job.as_ref()
    }

    pub fn status(&self) -> BulkJobStatus {
        self.job.as_ref().map_or(BulkJobStatus::Idle, |job| job.status)
    }

    pub fn is_in_flight(&self) -> bool {
        self.status() == BulkJobStatus::InFlight
    }

    /// Start a job for the chosen operation over `selection`.
    ///
    /// A rejection leaves every piece of state untouched.
    pub fn submit(&mut self, selection: &Selection) -> Result<BulkTicket, BulkRejection> {
        if self.is_in_flight() {
            return Err(BulkRejection::Busy);
        }
        if selection.is_empty() {
            return Err(BulkRejection::EmptySelection);
        }
        let operation = self.chosen.ok_or(BulkRejection::NoOperation)?;

        let target_ids = selection.ids();
        info!(operation = %operation, count = target_ids.len(), "Submitting bulk job");
        self.job = Some(BulkJob {
            operation,
            target_ids: target_ids.clone(),
            status: BulkJobStatus::InFlight,
        });

        Ok(BulkTicket {
            operation,
            target_ids,
        })
    }

    /// Record the backend's answer for the in-flight job.
    ///
    /// Success clears the selection and the chosen operation; failure keeps
    /// both so the operator can resubmit.
    pub fn acknowledge(
        &mut self,
        result: Result<(), BackendError>,
        selection: &mut Selection,
    ) -> BulkJobStatus {
        let Some(job) = self.job.as_mut().filter(|job| job.status == BulkJobStatus::InFlight)
        else {
            warn!("Bulk acknowledgement without a job in flight, ignoring");
            return self.status();
        };

        match result {
            Ok(()) => {
                info!(
                    operation = %job.operation,
                    count = job.target_ids.len(),
                    "Bulk job accepted"
                );
                job.status = BulkJobStatus::Succeeded;
                selection.deselect_all();
                self.chosen = None;
            }
            Err(e) => {
                warn!(operation = %job.operation, error = %e, "Bulk job failed");
                job.status = BulkJobStatus::Failed;
            }
        }
        job.status
    }

    /// Submit, wait for the backend and acknowledge in one step.
    pub async fn execute(
        &mut self,
        selection: &mut Selection,
        actions: &dyn BulkActions,
    ) -> Result<BulkJobStatus, BulkRejection> {
        let ticket = self.submit(selection)?;
        let result = actions.apply(ticket.operation, &ticket.target_ids).await;
        Ok(self.acknowledge(result, selection))
    }
}
