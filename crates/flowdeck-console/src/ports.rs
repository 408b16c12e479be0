//! Collaborators the console talks to.
//!
//! The console never knows about transports. A backend client implements
//! these traits; tests use in-memory fakes.

use async_trait::async_trait;

use flowdeck_core::{BulkOperation, SearchResultPage, WorkflowId};

use crate::error::BackendError;
use crate::query::SearchRequest;

/// Executes search queries against the execution index.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run one search and return the requested page.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResultPage, BackendError>;
}

/// Applies bulk operations to executions by id.
///
/// Implementors provide [`apply`](BulkActions::apply); the per-operation
/// methods are conveniences over it. An `Ok` means the backend accepted the
/// submission, not that every execution changed state.
#[async_trait]
pub trait BulkActions: Send + Sync {
    /// Submit `operation` for every id in `ids`.
    async fn apply(&self, operation: BulkOperation, ids: &[WorkflowId]) -> Result<(), BackendError>;

    async fn pause_by_ids(&self, ids: &[WorkflowId]) -> Result<(), BackendError> {
        self.apply(BulkOperation::Pause, ids).await
    }

    async fn resume_by_ids(&self, ids: &[WorkflowId]) -> Result<(), BackendError> {
        self.apply(BulkOperation::Resume, ids).await
    }

    async fn retry_by_ids(&self, ids: &[WorkflowId]) -> Result<(), BackendError> {
        self.apply(BulkOperation::Retry, ids).await
    }

    async fn restart_by_ids(&self, ids: &[WorkflowId]) -> Result<(), BackendError> {
        self.apply(BulkOperation::Restart, ids).await
    }

    async fn terminate_by_ids(&self, ids: &[WorkflowId]) -> Result<(), BackendError> {
        self.apply(BulkOperation::Terminate, ids).await
    }
}

/// Lists the workflow type names known to the backend.
#[async_trait]
pub trait TypeCatalog: Send + Sync {
    /// Names of every registered workflow definition.
    async fn workflow_types(&self) -> Result<Vec<String>, BackendError>;
}

/// The navigation host that holds the shareable location.
pub trait Navigator: Send {
    /// Push a new history entry carrying `query`.
    fn push(&mut self, query: &str);
}
