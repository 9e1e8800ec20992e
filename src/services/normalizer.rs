//! Cost report normalization service
//!
//! Folds a raw grouped report into one total and a list of per-dimension
//! amounts, repairing the zero-total placeholder some grouped responses carry.

use tracing::{debug, warn};

use crate::types::{CostGroup, DimensionCost, MetricValue, NormalizedReport, RawCostReport};

/// Label for groups that arrive without a usable key
pub const UNKNOWN_DIMENSION: &str = "Unknown";

const DEFAULT_CURRENCY: &str = "USD";

/// Normalize a dimension key to canonical form.
///
/// Transformations:
/// - Trim and collapse inner whitespace: "  Amazon   S3 " → "Amazon S3"
/// - Missing or blank key → "Unknown"
///
/// # Examples
/// ```
/// use costlens::services::normalizer::normalize_dimension_name;
///
/// assert_eq!(normalize_dimension_name(Some(" Amazon  S3 ")), "Amazon S3");
/// assert_eq!(normalize_dimension_name(None), "Unknown");
/// ```
pub fn normalize_dimension_name(key: Option<&str>) -> String {
    let collapsed = key
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.is_empty() {
        UNKNOWN_DIMENSION.to_string()
    } else {
        collapsed
    }
}

/// Parse a decimal-string amount; missing or malformed amounts count as 0
fn parse_amount(value: Option<&MetricValue>, context: &str) -> f64 {
    let Some(raw) = value.and_then(|v| v.amount.as_deref()) else {
        return 0.0;
    };
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => amount,
        _ => {
            warn!(amount = raw, context, "unparseable cost amount, counting as 0");
            0.0
        }
    }
}

fn group_name(group: &CostGroup) -> String {
    normalize_dimension_name(group.keys.first().map(String::as_str))
}

/// Normalize a raw report for `metric`.
///
/// The declared total wins unless it is exactly zero while some dimension is
/// nonzero; then the total is the sum of dimension amounts.
pub fn normalize_report(report: &RawCostReport, metric: &str) -> NormalizedReport {
    let mut declared_total = 0.0;
    let mut currency: Option<String> = None;
    let mut dimensions: Vec<DimensionCost> = Vec::new();

    for result in &report.results_by_time {
        let total = result.total.get(metric);
        declared_total += parse_amount(total, "total");
        if currency.is_none() {
            currency = total.and_then(|t| t.unit.clone());
        }

        for group in &result.groups {
            let name = group_name(group);
            let value = group.metrics.get(metric);
            let amount = parse_amount(value, &name);

            match dimensions.iter_mut().find(|d| d.name == name) {
                Some(existing) => existing.amount += amount,
                None => dimensions.push(DimensionCost::new(name, amount)),
            }
        }
    }

    if currency.is_none() {
        currency = report
            .results_by_time
            .iter()
            .flat_map(|r| &r.groups)
            .find_map(|g| g.metrics.get(metric).and_then(|m| m.unit.clone()));
    }

    let dimension_sum: f64 = dimensions.iter().map(|d| d.amount).sum();
    let total = if declared_total == 0.0 && dimensions.iter().any(|d| d.amount != 0.0) {
        debug!(
            dimension_sum,
            dimensions = dimensions.len(),
            "declared total is zero, using dimension sum"
        );
        dimension_sum
    } else {
        declared_total
    };

    NormalizedReport {
        total,
        currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        dimensions,
    }
}
