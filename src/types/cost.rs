//! Normalized and compared cost types

use serde::Serialize;

use super::Period;

/// Cost attributed to one dimension value (e.g., a billed service)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DimensionCost {
    pub name: String,
    pub amount: f64,
    /// Percentage of the period total, 0 when the total is 0
    pub share_of_total: f64,
    /// Percentage change against the previous period, absent without a comparison
    pub change_from_previous: Option<f64>,
}

impl DimensionCost {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            share_of_total: 0.0,
            change_from_previous: None,
        }
    }
}

/// One period's report after reconciliation. Shares and changes are not set yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReport {
    pub total: f64,
    pub currency: String,
    /// In first-encounter order, unique by name
    pub dimensions: Vec<DimensionCost>,
}

impl NormalizedReport {
    pub fn amount_of(&self, name: &str) -> Option<f64> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Direction word used in summaries
    pub fn direction_word(&self) -> &'static str {
        match self {
            Trend::Increasing => "increase",
            Trend::Decreasing => "decrease",
            Trend::Stable => "stable",
        }
    }
}

/// Comparison of a period against its mirror previous period
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonResult {
    pub period: Period,
    pub total_amount: f64,
    pub currency: String,
    /// Descending by amount
    pub dimensions: Vec<DimensionCost>,
    pub month_over_month_change: Option<f64>,
    pub trend: Trend,
    pub summary_text: String,
}

impl ComparisonResult {
    pub fn top(&self, n: usize) -> &[DimensionCost] {
        &self.dimensions[..n.min(self.dimensions.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_of() {
        let report = NormalizedReport {
            total: 15.0,
            currency: "USD".into(),
            dimensions: vec![DimensionCost::new("EC2", 10.0), DimensionCost::new("S3", 5.0)],
        };
        assert_eq!(report.amount_of("S3"), Some(5.0));
        assert_eq!(report.amount_of("RDS"), None);
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Trend::Increasing).unwrap(),
            "\"increasing\""
        );
        assert_eq!(serde_json::to_string(&Trend::Stable).unwrap(), "\"stable\"");
    }

    #[test]
    fn test_top_clamps_to_len() {
        let result = ComparisonResult {
            period: Period::month(2025, 5).unwrap(),
            total_amount: 1.0,
            currency: "USD".into(),
            dimensions: vec![DimensionCost::new("EC2", 1.0)],
            month_over_month_change: None,
            trend: Trend::Stable,
            summary_text: String::new(),
        };
        assert_eq!(result.top(5).len(), 1);
        assert_eq!(result.top(0).len(), 0);
    }
}
