//! Summary digest and optimization hints

use std::fmt::Write;

use crate::types::{ComparisonResult, DimensionCost};

/// Dimensions inspected for hints
pub const DEFAULT_HINT_TOP_N: usize = 5;
/// Dimensions at or below this cost get no hint
pub const DEFAULT_HINT_MIN_COST: f64 = 100.0;
/// Unrecognized dimensions above this cost get a generic review hint
pub const DEFAULT_HINT_REVIEW_COST: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintOptions {
    pub top_n: usize,
    pub min_cost: f64,
    pub review_cost: f64,
}

impl Default for HintOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_HINT_TOP_N,
            min_cost: DEFAULT_HINT_MIN_COST,
            review_cost: DEFAULT_HINT_REVIEW_COST,
        }
    }
}

/// Fixed advice for a well-known dimension.
///
/// Patterns match whole words of the dimension name, case-insensitively.
/// A name containing any exclusion word gets no advice from the rule.
struct HintRule {
    patterns: &'static [&'static str],
    excludes: &'static [&'static str],
    advice: &'static str,
}

const HINT_RULES: &[HintRule] = &[
    HintRule {
        patterns: &["elastic compute cloud", "ec2"],
        // "Amazon EC2 Container Registry (ECR)", "Amazon EC2 Container Service"
        excludes: &["container"],
        advice: "Consider Savings Plans or Reserved Instances for steady compute usage and rightsize underutilized instances.",
    },
    HintRule {
        patterns: &["simple storage service", "s3"],
        excludes: &[],
        advice: "Add lifecycle policies to move infrequently accessed objects to cheaper storage classes such as Intelligent-Tiering or Glacier.",
    },
    HintRule {
        patterns: &["relational database service", "rds"],
        excludes: &[],
        advice: "Rightsize database instances, buy Reserved Instances for always-on databases and stop idle development databases.",
    },
];

fn words(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True if the space-separated `phrase` occurs as consecutive words
fn has_phrase(words: &[String], phrase: &str) -> bool {
    let wanted: Vec<&str> = phrase.split(' ').collect();
    words
        .windows(wanted.len())
        .any(|window| window.iter().zip(&wanted).all(|(w, p)| w == p))
}

fn advice_for(name: &str) -> Option<&'static str> {
    let words = words(name);
    HINT_RULES
        .iter()
        .find(|rule| {
            rule.patterns.iter().any(|p| has_phrase(&words, p))
                && !rule.excludes.iter().any(|x| has_phrase(&words, x))
        })
        .map(|rule| rule.advice)
}

fn format_dimension(dimension: &DimensionCost, currency: &str) -> String {
    format!(
        "{}: {:.2} {} ({:.2}% of total)",
        dimension.name, dimension.amount, currency, dimension.share_of_total
    )
}

/// Render a short digest of `result` listing at most `top_n` dimensions.
///
/// Without a previous-period change only the total and period are rendered.
pub fn render_summary(result: &ComparisonResult, top_n: usize) -> String {
    let mut text = format!(
        "Total cost for {}: {:.2} {}.",
        result.period, result.total_amount, result.currency
    );

    let Some(change) = result.month_over_month_change else {
        return text;
    };

    let _ = write!(
        text,
        " Change vs previous period: {:+.2}% ({}).",
        change,
        result.trend.direction_word()
    );

    let top = result.top(top_n);
    if !top.is_empty() {
        let listed: Vec<String> = top
            .iter()
            .map(|d| format_dimension(d, &result.currency))
            .collect();
        let _ = write!(text, " Top cost drivers: {}.", listed.join("; "));
    }

    text
}

/// Rule-based optimization hints for the largest dimensions
pub fn optimization_hints(result: &ComparisonResult, options: &HintOptions) -> Vec<String> {
    result
        .top(options.top_n)
        .iter()
        .filter(|d| d.amount > options.min_cost)
        .filter_map(|d| {
            let cost = format!("{:.2} {}", d.amount, result.currency);
            match advice_for(&d.name) {
                Some(advice) => Some(format!("{} ({}): {}", d.name, cost, advice)),
                None if d.amount > options.review_cost => Some(format!(
                    "{} ({}): Review usage of this service for idle or oversized resources.",
                    d.name, cost
                )),
                None => None,
            }
        })
        .collect()
}
