//! Status enums for workflow executions and bulk jobs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status of a workflow execution as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// Workflow is executing.
    Running,
    /// Workflow finished successfully.
    Completed,
    /// Workflow failed.
    Failed,
    /// Workflow exceeded its timeout.
    TimedOut,
    /// Workflow was terminated by an operator or the system.
    Terminated,
    /// Workflow is paused and will not schedule new tasks.
    Paused,
}

impl WorkflowStatus {
    /// Every status, in the order filter suggestions are offered.
    pub const ALL: [WorkflowStatus; 6] = [
        Self::Running,
        Self::Completed,
        Self::Failed,
        Self::TimedOut,
        Self::Terminated,
        Self::Paused,
    ];

    /// Wire name used in filter expressions and deep links.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Terminated => "TERMINATED",
            Self::Paused => "PAUSED",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Status of the single bulk job a console tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkJobStatus {
    /// No job submitted yet.
    #[default]
    Idle,
    /// Submitted, awaiting backend acknowledgement.
    InFlight,
    /// Backend accepted the job.
    Succeeded,
    /// Backend rejected the job or could not be reached.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("failed".parse::<WorkflowStatus>(), Ok(WorkflowStatus::Failed));
        assert_eq!(" TIMED_OUT ".parse::<WorkflowStatus>(), Ok(WorkflowStatus::TimedOut));
        assert!(matches!(
            "SLEEPING".parse::<WorkflowStatus>(),
            Err(CoreError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_wire_names_match_serde() {
        for status in WorkflowStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_bulk_job_starts_idle() {
        assert_eq!(BulkJobStatus::default(), BulkJobStatus::Idle);
        assert_eq!(serde_json::to_string(&BulkJobStatus::InFlight).unwrap(), "\"in_flight\"");
    }
}
