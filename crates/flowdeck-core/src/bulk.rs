//! Bulk operation kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An action applied to many workflow executions in one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    /// Pause running executions.
    Pause,
    /// Resume paused executions.
    Resume,
    /// Retry the last failed task of each execution.
    Retry,
    /// Restart executions from the beginning.
    Restart,
    /// Terminate executions.
    Terminate,
}

impl BulkOperation {
    /// Every operation, in the order an operator is offered them.
    pub const ALL: [BulkOperation; 5] = [
        Self::Pause,
        Self::Resume,
        Self::Restart,
        Self::Retry,
        Self::Terminate,
    ];

    /// Lowercase name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Retry => "retry",
            Self::Restart => "restart",
            Self::Terminate => "terminate",
        }
    }
}

impl fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkOperation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operation() {
        assert_eq!("Terminate".parse::<BulkOperation>(), Ok(BulkOperation::Terminate));
        assert_eq!("retry".parse::<BulkOperation>(), Ok(BulkOperation::Retry));
        assert!("".parse::<BulkOperation>().is_err());
        assert!("delete".parse::<BulkOperation>().is_err());
    }

    #[test]
    fn test_all_operations_have_distinct_names() {
        let mut names: Vec<&str> = BulkOperation::ALL.iter().map(|op| op.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BulkOperation::ALL.len());
    }
}
