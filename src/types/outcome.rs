//! Caller-facing analysis outcome

use serde::Serialize;

use super::{ComparisonResult, Period};

/// Bounded classification of cost source failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Authentication,
    Authorization,
    Throttling,
    InvalidParameter,
    ServiceUnavailable,
    QuotaExceeded,
    Unknown,
}

/// Classified fetch failure returned instead of a raw error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FetchFailure {
    pub category: ErrorCategory,
    /// Upstream error text as received
    pub message: String,
    pub explanation: String,
    pub suggestions: Vec<String>,
    pub retryable: bool,
}

/// Successful analysis payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostAnalysis {
    #[serde(flatten)]
    pub comparison: ComparisonResult,
    pub previous_period: Period,
    /// Name of the period resolution rule that matched the query
    pub resolved_by: String,
    pub optimization_hints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success(CostAnalysis),
    Failure(FetchFailure),
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trend;

    #[test]
    fn test_category_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCategory::ServiceUnavailable).unwrap();
        assert_eq!(json, "\"SERVICE_UNAVAILABLE\"");
    }

    #[test]
    fn test_failure_outcome_is_tagged() {
        let outcome = AnalysisOutcome::Failure(FetchFailure {
            category: ErrorCategory::Throttling,
            message: "Rate exceeded".into(),
            explanation: "slow down".into(),
            suggestions: vec!["wait".into()],
            retryable: true,
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["category"], "THROTTLING");
        assert_eq!(value["retryable"], true);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_success_outcome_flattens_comparison() {
        let may = Period::month(2025, 5).unwrap();
        let outcome = AnalysisOutcome::Success(CostAnalysis {
            comparison: ComparisonResult {
                period: may,
                total_amount: 200.0,
                currency: "USD".into(),
                dimensions: Vec::new(),
                month_over_month_change: Some(100.0),
                trend: Trend::Increasing,
                summary_text: "text".into(),
            },
            previous_period: may.previous(),
            resolved_by: "month-name".into(),
            optimization_hints: Vec::new(),
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["total_amount"], 200.0);
        assert_eq!(value["trend"], "increasing");
        assert_eq!(value["period"]["start"], "2025-05-01");
        assert_eq!(value["previous_period"]["end"], "2025-04-30");
        assert!(outcome.is_success());
    }
}
