//! HTTP client for the orchestration backend's REST endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use flowdeck_console::query::SORT_ORDER;
use flowdeck_console::{BackendError, BulkActions, SearchRequest, SearchService, TypeCatalog};
use flowdeck_core::{BulkOperation, ExecutionRecord, SearchResultPage, WorkflowId};

use crate::error::ClientError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Search endpoint response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    total_hits: u64,
    #[serde(default)]
    results: Vec<ExecutionRecord>,
}

/// Workflow definition, reduced to what the type catalog needs.
#[derive(Debug, Deserialize)]
struct WorkflowDef {
    name: String,
}

/// Method and path of a bulk endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRoute {
    pub method: Method,
    pub path: &'static str,
}

/// The backend endpoint each bulk operation maps to.
pub fn bulk_route(operation: BulkOperation) -> BulkRoute {
    let (method, path) = match operation {
        BulkOperation::Pause => (Method::PUT, "/workflow/bulk/pause"),
        BulkOperation::Resume => (Method::PUT, "/workflow/bulk/resume"),
        BulkOperation::Retry => (Method::POST, "/workflow/bulk/retry"),
        BulkOperation::Restart => (Method::POST, "/workflow/bulk/restart"),
        BulkOperation::Terminate => (Method::DELETE, "/workflow/bulk/terminate"),
    };
    BulkRoute { method, path }
}

/// Compose the backend's `freeText` parameter.
///
/// Empty text searches everything (`*`). Exact matching quotes the text as a
/// phrase. A lookback window is AND-ed on as a `startTime` range.
pub fn free_text_param(text: &str, match_exact: bool, lookback_hours: Option<u32>) -> String {
    let text = text.trim();
    let mut parts = Vec::with_capacity(2);

    if text.is_empty() {
        parts.push("*".to_string());
    } else if match_exact && !(text.len() > 1 && text.starts_with('"') && text.ends_with('"')) {
        parts.push(format!("\"{}\"", text));
    } else {
        parts.push(text.to_string());
    }

    if let Some(hours) = lookback_hours {
        parts.push(format!("startTime:[now-{}h TO now]", hours));
    }

    parts.join(" AND ")
}

/// HTTP client for the backend REST API.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client with reqwest defaults.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client whose requests time out after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the backend is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Get JSON from an endpoint.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self.inner.get(&url).query(query).send().await?;
        let response = check_status(response, path).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }

    /// Run one search against the execution index.
    pub async fn search_workflows(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResultPage, ClientError> {
        let free_text = free_text_param(
            &request.free_text,
            request.match_exact,
            request.lookback_hours,
        );
        let query = [
            ("start", request.offset.to_string()),
            ("size", request.size().to_string()),
            ("sort", SORT_ORDER.to_string()),
            ("freeText", free_text),
            ("query", request.expression.clone()),
        ];

        let response: SearchResponse = self.get_json("/workflow/search", &query).await?;
        debug!(
            seq = %request.seq,
            total = response.total_hits,
            returned = response.results.len(),
            "Search response"
        );
        Ok(SearchResultPage::new(response.results, response.total_hits))
    }

    /// Submit a bulk operation for `ids`.
    pub async fn bulk(
        &self,
        operation: BulkOperation,
        ids: &[WorkflowId],
    ) -> Result<(), ClientError> {
        let route = bulk_route(operation);
        let url = format!("{}{}", self.base_url, route.path);
        info!(operation = %operation, count = ids.len(), url = %url, "Bulk request");

        let response = self
            .inner
            .request(route.method, &url)
            .json(ids)
            .send()
            .await?;
        check_status(response, route.path).await?;
        Ok(())
    }

    /// Names of every registered workflow definition.
    pub async fn list_workflow_types(&self) -> Result<Vec<String>, ClientError> {
        let defs: Vec<WorkflowDef> = self.get_json("/metadata/workflow", &[]).await?;
        Ok(defs.into_iter().map(|def| def.name).collect())
    }
}

async fn check_status(response: Response, path: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        path: path.to_string(),
        message,
    })
}

#[async_trait]
impl SearchService for HttpClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResultPage, BackendError> {
        Ok(self.search_workflows(request).await?)
    }
}

#[async_trait]
impl BulkActions for HttpClient {
    async fn apply(
        &self,
        operation: BulkOperation,
        ids: &[WorkflowId],
    ) -> Result<(), BackendError> {
        Ok(self.bulk(operation, ids).await?)
    }
}

#[async_trait]
impl TypeCatalog for HttpClient {
    async fn workflow_types(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.list_workflow_types().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use flowdeck_console::{FilterStore, QueryDispatcher};
    use flowdeck_core::{FilterCriteria, WorkflowStatus};

    fn request_for(criteria: FilterCriteria) -> SearchRequest {
        let mut store = FilterStore::new(criteria);
        QueryDispatcher::new().dispatch_if_dirty(&mut store).unwrap()
    }

    #[test]
    fn test_free_text_param() {
        assert_eq!(free_text_param("", true, None), "*");
        assert_eq!(free_text_param("  ", false, Some(2)), "* AND startTime:[now-2h TO now]");
        assert_eq!(free_text_param("order 42", true, None), "\"order 42\"");
        assert_eq!(free_text_param("\"already\"", true, None), "\"already\"");
        assert_eq!(
            free_text_param("order", false, Some(24)),
            "order AND startTime:[now-24h TO now]"
        );
    }

    #[test]
    fn test_every_operation_has_a_route() {
        let mut paths: Vec<&str> = BulkOperation::ALL
            .iter()
            .map(|op| bulk_route(*op).path)
            .collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), BulkOperation::ALL.len());
        assert_eq!(bulk_route(BulkOperation::Terminate).method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_search_sends_parameters_and_decodes_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/workflow/search"))
            .and(query_param("start", "100"))
            .and(query_param("size", "100"))
            .and(query_param("sort", "startTime:DESC"))
            .and(query_param("freeText", "\"order\" AND startTime:[now-6h TO now]"))
            .and(query_param("query", "status IN (FAILED)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalHits": 150,
                "results": [
                    {"workflowId": "wf-1", "workflowType": "billing", "status": "FAILED"},
                    {"workflowId": "wf-2", "workflowType": "billing", "status": "FAILED",
                     "reasonForIncompletion": "card declined"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&format!("{}/api/", server.uri()));
        let request = request_for(
            FilterCriteria::default()
                .with_free_text("order")
                .with_status(WorkflowStatus::Failed)
                .with_lookback_hours(6)
                .with_page_offset(100),
        );

        let page = client.search(&request).await.unwrap();
        assert_eq!(page.total_matches, 150);
        assert_eq!(page.returned_count(), 2);
        assert_eq!(page.records[1].reason_for_incompletion.as_deref(), Some("card declined"));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_search_failure_maps_to_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workflow/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("index unavailable"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client
            .search(&request_for(FilterCriteria::default()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected {
                status: 500,
                message: "index unavailable".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_bulk_uses_operation_route() {
        let ids = vec![WorkflowId::new("wf-1"), WorkflowId::new("wf-2")];

        for operation in BulkOperation::ALL {
            let server = MockServer::start().await;
            let route = bulk_route(operation);
            Mock::given(method(route.method.as_str()))
                .and(path(route.path))
                .and(body_json(json!(["wf-1", "wf-2"])))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "bulkSuccessfulResults": ["wf-1", "wf-2"],
                    "bulkErrorResults": {}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let client = HttpClient::new(&server.uri());
            client.apply(operation, &ids).await.unwrap();
            server.verify().await;
        }
    }

    #[tokio::test]
    async fn test_bulk_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/workflow/bulk/pause"))
            .respond_with(ResponseTemplate::new(400).set_body_string("too many ids"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client
            .pause_by_ids(&[WorkflowId::new("wf-1")])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_workflow_types() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/workflow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "billing", "version": 1},
                {"name": "shipping", "version": 4}
            ])))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        assert_eq!(client.workflow_types().await.unwrap(), vec!["billing", "shipping"]);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let client =
            HttpClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.workflow_types().await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }
}
