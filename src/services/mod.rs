//! Services for period resolution, cost normalization and comparison

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod cost_source;
pub mod error_classifier;
pub mod normalizer;
pub mod period_resolver;
pub mod phrase;
pub mod report_cache;
pub mod summary;

pub use analysis::CostAnalysisService;
pub use analyzer::{AnalysisOptions, Analyzer};
pub use config::Config;
pub use cost_source::{CostSource, HttpCostSource};
pub use error_classifier::classify;
pub use normalizer::{normalize_dimension_name, normalize_report};
pub use period_resolver::{PeriodResolver, Resolution};
pub use report_cache::{CachingCostSource, ReportCacheService};
pub use summary::{optimization_hints, render_summary, HintOptions};
