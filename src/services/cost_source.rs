//! Cost sources: where raw cost reports come from

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::types::{CostQuery, FetchError, Granularity, RawCostReport};

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Provider of grouped cost reports
pub trait CostSource: Send + Sync {
    /// Source name (e.g., "http")
    fn name(&self) -> &str;

    /// Fetch the report for one query
    fn fetch(&self, query: &CostQuery) -> Result<RawCostReport, FetchError>;
}

impl<T: CostSource + ?Sized> CostSource for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, query: &CostQuery) -> Result<RawCostReport, FetchError> {
        (**self).fetch(query)
    }
}

/// Request body in the Cost Explorer `GetCostAndUsage` shape
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CostAndUsageRequest {
    pub time_period: RequestTimePeriod,
    pub granularity: Granularity,
    pub group_by: Vec<GroupDefinition>,
    pub metrics: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RequestTimePeriod {
    pub start: String,
    /// Exclusive
    pub end: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDefinition {
    #[serde(rename = "Type")]
    pub kind: String,
    pub key: String,
}

impl CostAndUsageRequest {
    /// Build a request; the API end date is exclusive, so it is the day after the period
    pub fn from_query(query: &CostQuery) -> Self {
        let period = query.period;
        Self {
            time_period: RequestTimePeriod {
                start: period.start().format("%Y-%m-%d").to_string(),
                end: (period.end() + Duration::days(1))
                    .format("%Y-%m-%d")
                    .to_string(),
            },
            granularity: query.granularity,
            group_by: vec![GroupDefinition {
                kind: "DIMENSION".to_string(),
                key: query.group_by.clone(),
            }],
            metrics: vec![query.metric.clone()],
        }
    }
}

/// Cost source that POSTs `GetCostAndUsage`-style requests to an HTTP endpoint
pub struct HttpCostSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpCostSource {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::new(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

impl CostSource for HttpCostSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, query: &CostQuery) -> Result<RawCostReport, FetchError> {
        let request = CostAndUsageRequest::from_query(query);
        debug!(endpoint = %self.endpoint, period = %query.period, "requesting cost report");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            // Provider error names live in the body
            let body = response.text().unwrap_or_default();
            return Err(FetchError::new(format!("HTTP {}: {}", status, body.trim())));
        }

        let report: RawCostReport = response
            .json()
            .map_err(|e| FetchError::new(format!("JSON parse error: {}", error_chain(&e))))?;

        info!(
            period = %query.period,
            result_sets = report.results_by_time.len(),
            "fetched cost report"
        );
        Ok(report)
    }
}

/// Error text including every `source()` below it
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// reqwest's own message omits the cause, so name the failure kind explicitly
fn transport_error(err: &reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "could not connect"
    } else {
        "request failed"
    };
    FetchError::new(format!("HTTP {}: {}", kind, error_chain(err)))
}
