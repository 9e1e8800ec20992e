//! Comparative analysis of a period against its previous period

use crate::services::summary::render_summary;
use crate::types::{ComparisonResult, DimensionCost, NormalizedReport, Period, Trend};

/// Changes with an absolute value below this percentage are "stable"
pub const DEFAULT_TREND_THRESHOLD: f64 = 5.0;

/// Dimensions listed in the summary digest
pub const DEFAULT_SUMMARY_TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    pub trend_threshold: f64,
    pub summary_top_n: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            summary_top_n: DEFAULT_SUMMARY_TOP_N,
        }
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage change from `previous` to `current`, rounded to 2 places.
///
/// A zero `previous` gives 100 for new spend and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

/// Share of `total`, rounded to 2 places; 0 when the total is 0
pub fn share_of(amount: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    round2(amount / total * 100.0)
}

/// Stable below `threshold` (exclusive); otherwise by sign
pub fn classify_trend(change: f64, threshold: f64) -> Trend {
    if change.abs() < threshold {
        Trend::Stable
    } else if change > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

/// Analyzer for period-over-period cost comparison
pub struct Analyzer;

impl Analyzer {
    /// Compare `current` with `previous` for `period`.
    ///
    /// Only current-period dimensions are reported; a dimension new in the
    /// current period is compared against 0. Without a previous report the
    /// change fields stay absent and the trend is stable.
    pub fn compare(
        period: Period,
        current: NormalizedReport,
        previous: Option<&NormalizedReport>,
        options: &AnalysisOptions,
    ) -> ComparisonResult {
        let total = current.total;

        let mut dimensions: Vec<DimensionCost> = current
            .dimensions
            .into_iter()
            .map(|d| {
                let change_from_previous = previous.map(|prev| {
                    percentage_change(d.amount, prev.amount_of(&d.name).unwrap_or(0.0))
                });
                DimensionCost {
                    share_of_total: share_of(d.amount, total),
                    change_from_previous,
                    ..d
                }
            })
            .collect();

        // Stable sort keeps encounter order for ties
        dimensions.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let month_over_month_change = previous.map(|prev| percentage_change(total, prev.total));
        let trend = month_over_month_change
            .map(|change| classify_trend(change, options.trend_threshold))
            .unwrap_or(Trend::Stable);

        let mut result = ComparisonResult {
            period,
            total_amount: total,
            currency: current.currency,
            dimensions,
            month_over_month_change,
            trend,
            summary_text: String::new(),
        };
        result.summary_text = render_summary(&result, options.summary_top_n);
        result
    }
}
