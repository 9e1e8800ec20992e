//! Free-text period resolution
//!
//! A query is checked against an ordered list of rules; the first rule that
//! produces a period wins. The final rule always matches, so resolution
//! never fails.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::phrase::{self, ParsedDate};
use crate::types::Period;

/// One layer of the resolution policy
pub trait ResolutionRule: Send + Sync {
    /// Rule name (e.g., "month-name")
    fn name(&self) -> &'static str;

    /// Resolve `query` relative to `today`, or pass to the next rule
    fn resolve(&self, query: &str, today: NaiveDate) -> Option<Period>;
}

/// Bare month name without any 4-digit token: that month of the current year.
///
/// Any 4-digit number in the query disables this rule, even one unrelated to
/// the month, so "May invoice 4321" goes to the phrase parser.
pub struct MonthNameRule;

impl ResolutionRule for MonthNameRule {
    fn name(&self) -> &'static str {
        "month-name"
    }

    fn resolve(&self, query: &str, today: NaiveDate) -> Option<Period> {
        if phrase::has_year_token(query) {
            return None;
        }
        let month = phrase::find_month_name(query)?;
        Period::month(today.year(), month)
    }
}

/// General phrase parser: whole month when no day was confirmed, else that day
pub struct PhraseRule;

impl ResolutionRule for PhraseRule {
    fn name(&self) -> &'static str {
        "phrase"
    }

    fn resolve(&self, query: &str, today: NaiveDate) -> Option<Period> {
        match phrase::parse(query, today)? {
            ParsedDate::Month { year, month } => Period::month(year, month),
            ParsedDate::Day(date) => Some(Period::single_day(date)),
        }
    }
}

/// "this month" / "last month" style keywords
pub struct KeywordRule;

impl ResolutionRule for KeywordRule {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn resolve(&self, query: &str, today: NaiveDate) -> Option<Period> {
        let lower = query.to_lowercase();
        if lower.contains("this month") || lower.contains("current month") {
            Some(Period::month_of(today))
        } else if lower.contains("last month") || lower.contains("previous month") {
            Some(Period::previous_month_of(today))
        } else {
            None
        }
    }
}

/// Current calendar month
pub struct DefaultRule;

impl ResolutionRule for DefaultRule {
    fn name(&self) -> &'static str {
        "default"
    }

    fn resolve(&self, _query: &str, today: NaiveDate) -> Option<Period> {
        Some(Period::month_of(today))
    }
}

/// A resolved period and the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub period: Period,
    pub rule: &'static str,
}

/// Ordered resolution policy
pub struct PeriodResolver {
    rules: Vec<Box<dyn ResolutionRule>>,
}

impl PeriodResolver {
    /// Create a resolver with the default rule order
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(MonthNameRule),
                Box::new(PhraseRule),
                Box::new(KeywordRule),
                Box::new(DefaultRule),
            ],
        }
    }

    /// Get all rules in evaluation order
    pub fn rules(&self) -> &[Box<dyn ResolutionRule>] {
        &self.rules
    }

    pub fn resolve(&self, query: &str, today: NaiveDate) -> Resolution {
        for rule in &self.rules {
            if let Some(period) = rule.resolve(query, today) {
                debug!(rule = rule.name(), %period, query, "resolved period");
                return Resolution {
                    period,
                    rule: rule.name(),
                };
            }
        }

        // Only reachable with a custom rule list lacking a catch-all
        Resolution {
            period: Period::month_of(today),
            rule: DefaultRule.name(),
        }
    }
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new()
    }
}
