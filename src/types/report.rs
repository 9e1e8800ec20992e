//! Raw cost report shape returned by the cost-reporting API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Period;

/// Time bucketing requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Monthly,
}

/// One fetch request: a period grouped by a single dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    pub period: Period,
    pub granularity: Granularity,
    /// Dimension key to group by (e.g., "SERVICE")
    pub group_by: String,
    /// Cost metric name (e.g., "UnblendedCost")
    pub metric: String,
}

impl CostQuery {
    pub fn monthly(period: Period, group_by: &str, metric: &str) -> Self {
        Self {
            period,
            granularity: Granularity::Monthly,
            group_by: group_by.to_string(),
            metric: metric.to_string(),
        }
    }

    /// Same grouping and metric for a different period
    pub fn with_period(&self, period: Period) -> Self {
        Self {
            period,
            ..self.clone()
        }
    }
}

/// Grouped cost report, one result set per billing bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RawCostReport {
    #[serde(default)]
    pub results_by_time: Vec<ResultByTime>,
}

impl RawCostReport {
    /// True if any result set still carries provisional figures
    pub fn is_estimated(&self) -> bool {
        self.results_by_time.iter().any(|r| r.estimated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ResultByTime {
    #[serde(default)]
    pub time_period: Option<TimePeriod>,
    /// Declared totals keyed by metric name. Often empty or zero when grouped.
    #[serde(default)]
    pub total: HashMap<String, MetricValue>,
    #[serde(default)]
    pub groups: Vec<CostGroup>,
    #[serde(default)]
    pub estimated: bool,
}

/// API time window; `end` is exclusive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TimePeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct CostGroup {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub metrics: HashMap<String, MetricValue>,
}

/// Amount is transmitted as a decimal string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl MetricValue {
    pub fn new(amount: &str, unit: &str) -> Self {
        Self {
            amount: Some(amount.to_string()),
            unit: Some(unit.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_grouped_fixture() {
        let json = include_str!("../../tests/fixtures/cost-report-grouped.json");
        let report: RawCostReport = serde_json::from_str(json).unwrap();

        assert_eq!(report.results_by_time.len(), 1);
        let result = &report.results_by_time[0];
        assert_eq!(result.groups.len(), 4);
        assert_eq!(result.groups[0].keys, vec!["Amazon Elastic Compute Cloud - Compute"]);
        assert!(result.estimated);
        assert!(report.is_estimated());
    }

    #[test]
    fn test_deserialize_missing_fields_default() {
        let report: RawCostReport = serde_json::from_str(r#"{"ResultsByTime":[{}]}"#).unwrap();
        let result = &report.results_by_time[0];
        assert!(result.total.is_empty());
        assert!(result.groups.is_empty());
        assert!(result.time_period.is_none());
        assert!(!result.estimated);
        assert!(!report.is_estimated());
    }

    #[test]
    fn test_deserialize_empty_object() {
        let report: RawCostReport = serde_json::from_str("{}").unwrap();
        assert!(report.results_by_time.is_empty());
    }

    #[test]
    fn test_with_period_keeps_grouping() {
        let may = Period::month(2025, 5).unwrap();
        let april = Period::month(2025, 4).unwrap();
        let query = CostQuery::monthly(may, "SERVICE", "UnblendedCost");
        let prev = query.with_period(april);
        assert_eq!(prev.period, april);
        assert_eq!(prev.group_by, "SERVICE");
        assert_eq!(prev.metric, "UnblendedCost");
        assert_eq!(prev.granularity, Granularity::Monthly);
    }
}
