//! Execution records and result pages returned by the search backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::WorkflowId;
use crate::status::WorkflowStatus;

/// Summary of a single workflow execution, as indexed by the search backend.
///
/// Read-only to the console; the backend owns the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Unique execution identifier.
    pub workflow_id: WorkflowId,

    /// Name of the workflow definition.
    pub workflow_type: String,

    /// Definition version the execution runs.
    #[serde(default)]
    pub version: u32,

    /// Current execution status.
    pub status: WorkflowStatus,

    /// When the execution started.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    /// When the execution was last updated.
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,

    /// When the execution finished (if terminal).
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Input payload as a JSON string.
    #[serde(default)]
    pub input: Option<String>,

    /// Output payload as a JSON string.
    #[serde(default)]
    pub output: Option<String>,

    /// Why the execution did not complete.
    #[serde(default)]
    pub reason_for_incompletion: Option<String>,

    /// Comma-separated reference names of the failed tasks.
    #[serde(default)]
    pub failed_reference_task_names: Option<String>,

    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl ExecutionRecord {
    /// Create a record with only the identifying fields set (useful for testing).
    pub fn new(
        workflow_id: impl Into<WorkflowId>,
        workflow_type: impl Into<String>,
        status: WorkflowStatus,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            workflow_type: workflow_type.into(),
            version: 1,
            status,
            start_time: None,
            update_time: None,
            end_time: None,
            input: None,
            output: None,
            reason_for_incompletion: None,
            failed_reference_task_names: None,
            correlation_id: None,
        }
    }

    /// Reference names of the failed tasks.
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.failed_reference_task_names
            .as_deref()
            .map(|names| {
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultPage {
    /// Records on this page, in backend order.
    pub records: Vec<ExecutionRecord>,

    /// Number of executions matching the query across all pages.
    pub total_matches: u64,
}

impl SearchResultPage {
    /// Create a page from records and the overall match count.
    pub fn new(records: Vec<ExecutionRecord>, total_matches: u64) -> Self {
        Self {
            records,
            total_matches,
        }
    }

    /// Number of records actually returned on this page.
    pub fn returned_count(&self) -> u64 {
        self.records.len() as u64
    }

    /// Ids of every record on this page.
    pub fn ids(&self) -> impl Iterator<Item = &WorkflowId> {
        self.records.iter().map(|record| &record.workflow_id)
    }
}
