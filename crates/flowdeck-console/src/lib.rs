//! Execution list console for flowdeck.
//!
//! Keeps the search criteria, the shareable location, backend queries and
//! multi-select bulk actions consistent with each other. Everything here is
//! sans-IO except [`driver`], which runs a session on tokio against the
//! collaborator [`ports`].

pub mod bulk;
pub mod criteria;
pub mod driver;
pub mod error;
pub mod event;
pub mod location;
pub mod ports;
pub mod query;
pub mod selection;
pub mod session;

pub use bulk::{BulkJob, BulkOrchestrator, BulkTicket};
pub use criteria::{CriteriaSnapshot, CriteriaUpdate, FilterStore};
pub use driver::{Backends, ConsoleDriver, ConsoleView};
pub use error::{BackendError, BulkRejection};
pub use event::{ConsoleCommand, ConsoleEvent};
pub use location::{LocationSynchronizer, RecordingNavigator};
pub use ports::{BulkActions, Navigator, SearchService, TypeCatalog};
pub use query::{DispatchSeq, PageWindow, QueryDispatcher, SearchRequest};
pub use selection::Selection;
pub use session::WorkflowListSession;
