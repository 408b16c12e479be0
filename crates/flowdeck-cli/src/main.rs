//! flowdeck CLI - search workflow executions and run bulk operations.

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use flowdeck_client::HttpClient;
use flowdeck_console::location;
use flowdeck_console::{BackendError, RecordingNavigator, WorkflowListSession};
use flowdeck_core::{
    BulkJobStatus, BulkOperation, ExecutionRecord, WorkflowId, WorkflowStatus, PAGE_SIZE,
};

mod config;

use config::Config;

/// flowdeck - workflow execution search console
#[derive(Parser)]
#[command(name = "flowdeck")]
#[command(about = "Search workflow executions and run bulk operations", long_about = None)]
struct Cli {
    /// Backend REST API base URL
    #[arg(short, long)]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search executions and print one page
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print the page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List known workflow types
    Types,

    /// Run a bulk operation on executions
    Bulk {
        /// Operation (pause, resume, retry, restart, terminate)
        operation: BulkOperation,

        /// Execution ids
        ids: Vec<String>,

        /// Also select every execution on the page this link resolves to
        #[arg(long, value_name = "QUERY")]
        from_link: Option<String>,
    },

    /// Check backend health
    Health,
}

/// Search filters. A link is applied first, then each flag overrides it.
#[derive(Args)]
struct FilterArgs {
    /// Shareable link or query string to start from
    #[arg(long, value_name = "QUERY")]
    link: Option<String>,

    /// Free text to search for
    #[arg(short, long)]
    query: Option<String>,

    /// Workflow type filter (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Status filter (repeatable)
    #[arg(long = "status", value_name = "STATUS")]
    statuses: Vec<WorkflowStatus>,

    /// Only executions started within the last H hours
    #[arg(long, value_name = "H")]
    hours: Option<u32>,

    /// Result offset (aligned down to a page boundary)
    #[arg(long, value_name = "N")]
    start: Option<u64>,

    /// Match free text loosely instead of as an exact phrase
    #[arg(long)]
    no_exact: bool,
}

impl FilterArgs {
    fn session(&self) -> WorkflowListSession {
        let query = self.link.as_deref().map(location::query_of).unwrap_or("");
        let mut criteria = location::parse(query);

        if let Some(text) = &self.query {
            criteria.free_text = text.clone();
        }
        if !self.types.is_empty() {
            criteria.type_filters = self.types.iter().cloned().collect();
        }
        if !self.statuses.is_empty() {
            criteria.status_filters = self.statuses.iter().copied().collect();
        }
        if let Some(hours) = self.hours {
            criteria.lookback_hours = Some(hours);
        }
        if self.no_exact {
            criteria.match_exact = false;
        }
        if let Some(start) = self.start {
            criteria = criteria.with_page_offset(start);
        }

        WorkflowListSession::new(criteria, Box::new(RecordingNavigator::new()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays clean for tables and JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowdeck=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    debug!(server = %config.server_url, timeout_secs = config.timeout_secs, "Loaded config");

    let client = HttpClient::with_timeout(&config.server_url, config.timeout())?;

    match cli.command {
        Commands::Search { filters, json } => {
            search(&client, filters.session(), json).await?;
        }
        Commands::Types => {
            list_types(&client).await?;
        }
        Commands::Bulk {
            operation,
            ids,
            from_link,
        } => {
            bulk(&client, operation, ids, from_link).await?;
        }
        Commands::Health => {
            let healthy = client.health().await?;
            println!("{}: {}", client.base_url(), if healthy { "healthy" } else { "unhealthy" });
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn search(
    client: &HttpClient,
    mut session: WorkflowListSession,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = session.refresh().ok_or("nothing to search")?;
    session.execute_search(request, client).await;

    if let Some(err) = session.last_error() {
        return Err(format!("search failed: {}", err).into());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(session.page())?);
        return Ok(());
    }

    let page = session.page();
    let window = session.window();

    println!(
        "{:<36}  {:<24}  {:<10}  {:<19}  {}",
        "ID", "TYPE", "STATUS", "STARTED", "REASON"
    );
    println!("{}", "-".repeat(110));
    for record in &page.records {
        print_record(record);
    }
    println!();

    if page.total_matches == 0 {
        println!("No results found");
    } else {
        println!("Total Workflows Found: {}, Displaying {}", window.total, window);
    }

    let mut hints = Vec::new();
    if window.has_prev_page() {
        hints.push(format!("previous: --start {}", window.offset - PAGE_SIZE));
    }
    if window.has_next_page() {
        hints.push(format!("next: --start {}", window.offset.saturating_add(PAGE_SIZE)));
    }
    if !hints.is_empty() {
        println!("Pages: {}", hints.join(", "));
    }

    println!("Link: ?{}", session.shareable_query());
    Ok(())
}

async fn list_types(client: &HttpClient) -> Result<(), Box<dyn std::error::Error>> {
    let mut types = client.list_workflow_types().await?;
    types.sort();
    types.dedup();

    println!("Workflow types ({}):", types.len());
    for name in types {
        println!("  {}", name);
    }

    Ok(())
}

async fn bulk(
    client: &HttpClient,
    operation: BulkOperation,
    ids: Vec<String>,
    from_link: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = from_link.as_deref().map(location::query_of).unwrap_or("");
    let mut session = WorkflowListSession::open(query, Box::new(RecordingNavigator::new()));

    if from_link.is_some() {
        let request = session.search_clicked().ok_or("nothing to search")?;
        session.execute_search(request, client).await;
        if let Some(err) = session.last_error() {
            return Err(format!("search failed: {}", err).into());
        }
        session.select_all_visible();
        debug!(selected = session.selection().len(), "Selected page from link");
    }
    for id in ids {
        session.toggle_row(&WorkflowId::new(id), true);
    }
    session.choose_operation(Some(operation));

    let ticket = session.process_bulk()?;
    info!(
        operation = %ticket.operation,
        count = ticket.target_ids.len(),
        "Submitting bulk operation"
    );

    let result = client
        .bulk(ticket.operation, &ticket.target_ids)
        .await
        .map_err(BackendError::from);
    let failure = result.as_ref().err().cloned();

    match session.bulk_completed(result) {
        BulkJobStatus::Succeeded => {
            println!(
                "{} accepted for {} execution(s)",
                operation,
                ticket.target_ids.len()
            );
            Ok(())
        }
        _ => {
            let reason = failure.map(|e| e.to_string()).unwrap_or_default();
            Err(format!("{} failed: {}", operation, reason).into())
        }
    }
}

fn print_record(record: &ExecutionRecord) {
    let started = record
        .start_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let reason = record.reason_for_incompletion.as_deref().unwrap_or("");
    println!(
        "{:<36}  {:<24}  {:<10}  {:<19}  {}",
        record.workflow_id.as_str(),
        record.workflow_type,
        record.status.as_str(),
        started,
        reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(args: &[&str]) -> FilterArgs {
        let mut argv = vec!["flowdeck", "search"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Search { filters, .. } => filters,
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_flags_override_link() {
        let session = filters(&[
            "--link",
            "http://console/executions?q=order&status=FAILED&h=24&start=300",
            "--status",
            "running",
            "--hours",
            "6",
        ])
        .session();

        let criteria = session.criteria();
        assert_eq!(criteria.free_text, "order");
        assert!(criteria.status_filters.contains(&WorkflowStatus::Running));
        assert_eq!(criteria.status_filters.len(), 1);
        assert_eq!(criteria.lookback_hours, Some(6));
        assert_eq!(criteria.page_offset, 300);
    }

    #[test]
    fn test_start_is_aligned() {
        let session = filters(&["--start", "250", "--no-exact"]).session();
        assert_eq!(session.criteria().page_offset, 200);
        assert!(!session.criteria().match_exact);
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let cli = Cli::try_parse_from(["flowdeck", "types"]).unwrap();
        assert_eq!(cli.config().server_url, "http://localhost:8080/api");
        assert_eq!(cli.config().timeout_secs, 30);

        let cli = Cli::try_parse_from([
            "flowdeck",
            "--server",
            "http://conductor:9000/api",
            "--timeout",
            "5",
            "types",
        ])
        .unwrap();
        assert_eq!(cli.config().server_url, "http://conductor:9000/api");
        assert_eq!(cli.config().timeout(), std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_bulk_operation_parses() {
        let cli = Cli::try_parse_from(["flowdeck", "bulk", "terminate", "wf-1", "wf-2"]).unwrap();
        match cli.command {
            Commands::Bulk { operation, ids, from_link } => {
                assert_eq!(operation, BulkOperation::Terminate);
                assert_eq!(ids, vec!["wf-1", "wf-2"]);
                assert!(from_link.is_none());
            }
            _ => panic!("expected bulk"),
        }
    }
}
