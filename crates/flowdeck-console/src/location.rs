//! URL synchronizer: deep-link parsing and canonical serialization.
//!
//! Parameters: `q` (free text), `h` (lookback hours), `workflowTypes` and
//! `status` (comma-separated), `start` (page offset) and `exact` (phrase
//! match). Bad values never fail; they fall back to the defaults.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::debug;
use url::form_urlencoded;

use flowdeck_core::criteria::align_offset;
use flowdeck_core::{FilterCriteria, WorkflowStatus};

use crate::ports::Navigator;

const PARAM_QUERY: &str = "q";
const PARAM_HOURS: &str = "h";
const PARAM_TYPES: &str = "workflowTypes";
const PARAM_STATUS: &str = "status";
const PARAM_START: &str = "start";
const PARAM_EXACT: &str = "exact";

/// Parse a query string (with or without the leading `?`) into criteria.
pub fn parse(query: &str) -> FilterCriteria {
    let mut criteria = FilterCriteria::default();
    let query = query.strip_prefix('?').unwrap_or(query);

    for (key, raw) in form_urlencoded::parse(query.as_bytes()) {
        // Free text is taken verbatim; everything else tolerates padding.
        let value = raw.trim();
        match key.as_ref() {
            PARAM_QUERY => criteria.free_text = parse_text(&raw),
            PARAM_HOURS => criteria.lookback_hours = parse_number(key.as_ref(), value),
            PARAM_TYPES => criteria.type_filters = split_list(value).map(str::to_string).collect(),
            PARAM_STATUS => criteria.status_filters = parse_statuses(value),
            PARAM_START => {
                criteria.page_offset = parse_number::<u64>(key.as_ref(), value)
                    .map(align_offset)
                    .unwrap_or(0)
            }
            PARAM_EXACT => criteria.match_exact = parse_flag(value),
            other => debug!(param = %other, "Ignoring unknown location parameter"),
        }
    }

    criteria
}

/// Extract the query part of a full link, or return the input if it is one.
pub fn query_of(link: &str) -> &str {
    match link.split_once('?') {
        Some((_, query)) => query.split('#').next().unwrap_or_default(),
        None if link.contains('=') => link,
        None => "",
    }
}

/// Serialize criteria into a canonical query string.
///
/// Keys appear in a fixed order and set members are sorted, so equal
/// criteria always produce identical strings.
pub fn serialize(criteria: &FilterCriteria) -> String {
    let hours = criteria
        .lookback_hours
        .map(|h| h.to_string())
        .unwrap_or_default();
    let types = join(criteria.type_filters.iter().map(String::as_str));
    let statuses = join(criteria.status_filters.iter().map(WorkflowStatus::as_str));

    form_urlencoded::Serializer::new(String::new())
        .append_pair(PARAM_QUERY, &criteria.free_text)
        .append_pair(PARAM_HOURS, &hours)
        .append_pair(PARAM_TYPES, &types)
        .append_pair(PARAM_STATUS, &statuses)
        .append_pair(PARAM_START, &criteria.page_offset.to_string())
        .append_pair(PARAM_EXACT, if criteria.match_exact { "true" } else { "false" })
        .finish()
}

fn parse_text(value: &str) -> String {
    if value == "undefined" {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_number<T: std::str::FromStr>(param: &str, value: &str) -> Option<T> {
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            debug!(param = %param, value = %value, "Malformed number in location, using default");
            None
        }
    }
}

fn parse_statuses(value: &str) -> BTreeSet<WorkflowStatus> {
    split_list(value)
        .filter_map(|name| match name.parse() {
            Ok(status) => Some(status),
            Err(e) => {
                debug!(error = %e, "Dropping status from location");
                None
            }
        })
        .collect()
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "no")
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(",")
}

/// Keeps the navigation host in step with the dispatched criteria.
pub struct LocationSynchronizer {
    navigator: Box<dyn Navigator>,
    last_published: Option<String>,
}

impl LocationSynchronizer {
    pub fn new(navigator: Box<dyn Navigator>) -> Self {
        Self {
            navigator,
            last_published: None,
        }
    }

    /// Parse a location the host navigated to.
    ///
    /// The location is already in history, so it counts as published.
    pub fn restore(&mut self, query: &str) -> FilterCriteria {
        let criteria = parse(query);
        self.last_published = Some(serialize(&criteria));
        criteria
    }

    /// Push `criteria` to the host unless it already shows them.
    ///
    /// Returns true if a history entry was added.
    pub fn publish(&mut self, criteria: &FilterCriteria) -> bool {
        let query = serialize(criteria);
        if self.last_published.as_deref() == Some(query.as_str()) {
            return false;
        }
        debug!(query = %query, "Publishing location");
        self.navigator.push(&query);
        self.last_published = Some(query);
        true
    }

    /// The query string the host currently shows, if any was published.
    pub fn current(&self) -> Option<&str> {
        self.last_published.as_deref()
    }
}

/// Navigator that records history in memory.
///
/// Clones share the same history, so a caller can keep one handle while the
/// synchronizer owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pushed entry, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&mut self, query: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(query.to_string());
        }
    }
}
