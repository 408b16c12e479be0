//! Backend client library for flowdeck.
//!
//! Provides an HTTP client for the orchestration backend's search, bulk and
//! metadata endpoints, implementing the console's collaborator ports.

pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::HttpClient;
