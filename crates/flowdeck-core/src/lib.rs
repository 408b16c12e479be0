//! flowdeck Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Async runtime
//! - Navigation hosts
//!
//! All types here describe the workflow executions an operator browses and
//! the criteria used to find them.

pub mod bulk;
pub mod criteria;
pub mod error;
pub mod execution;
pub mod ids;
pub mod status;

// Re-export commonly used types
pub use bulk::BulkOperation;
pub use criteria::{FilterCriteria, PAGE_SIZE};
pub use error::CoreError;
pub use execution::{ExecutionRecord, SearchResultPage};
pub use ids::WorkflowId;
pub use status::{BulkJobStatus, WorkflowStatus};
