//! Cost analysis service: query in, classified outcome out
//!
//! Resolves the period, fetches it and its mirror previous period in
//! parallel, then normalizes, compares and summarizes. Fetch failures are
//! classified and returned, never propagated.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::services::analyzer::{AnalysisOptions, Analyzer};
use crate::services::error_classifier::classify;
use crate::services::normalizer::normalize_report;
use crate::services::summary::{optimization_hints, HintOptions};
use crate::services::{Config, CostSource, PeriodResolver};
use crate::types::{AnalysisOutcome, CostAnalysis, CostQuery, FetchFailure};

pub struct CostAnalysisService {
    source: Box<dyn CostSource>,
    resolver: PeriodResolver,
    group_by: String,
    metric: String,
    analysis: AnalysisOptions,
    hints: HintOptions,
}

impl CostAnalysisService {
    pub fn new(source: Box<dyn CostSource>, config: &Config) -> Self {
        Self {
            source,
            resolver: PeriodResolver::new(),
            group_by: config.group_by.clone(),
            metric: config.metric.clone(),
            analysis: config.analysis_options(),
            hints: config.hint_options(),
        }
    }

    /// Analyze costs for the period named by `query`, relative to `today`
    pub fn analyze(&self, query: &str, today: NaiveDate) -> AnalysisOutcome {
        let resolution = self.resolver.resolve(query, today);
        let period = resolution.period;
        let previous_period = period.previous();

        let current_query = CostQuery::monthly(period, &self.group_by, &self.metric);
        let previous_query = current_query.with_period(previous_period);

        info!(
            %period,
            %previous_period,
            rule = resolution.rule,
            source = self.source.name(),
            "analyzing costs"
        );

        let (current, previous) = rayon::join(
            || self.source.fetch(&current_query),
            || self.source.fetch(&previous_query),
        );

        let current = match current {
            Ok(report) => normalize_report(&report, &self.metric),
            Err(e) => {
                let failure = FetchFailure::from_error(&e);
                warn!(
                    category = ?failure.category,
                    retryable = failure.retryable,
                    error = %e,
                    "cost fetch failed"
                );
                return AnalysisOutcome::Failure(failure);
            }
        };

        let previous = match previous {
            Ok(report) => Some(normalize_report(&report, &self.metric)),
            Err(e) => {
                warn!(
                    category = ?classify(&e.message),
                    error = %e,
                    "previous period unavailable, reporting without comparison"
                );
                None
            }
        };

        let comparison = Analyzer::compare(period, current, previous.as_ref(), &self.analysis);
        let optimization_hints = optimization_hints(&comparison, &self.hints);

        AnalysisOutcome::Success(CostAnalysis {
            comparison,
            previous_period,
            resolved_by: resolution.rule.to_string(),
            optimization_hints,
        })
    }
}
