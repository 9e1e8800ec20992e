use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::services::{
    CachingCostSource, Config, CostAnalysisService, CostSource, HttpCostSource,
    PeriodResolver, ReportCacheService,
};
use crate::types::{AnalysisOutcome, CostAnalysis, FetchError, FetchFailure};

/// Compare cloud costs for a plain-language period against the period before it
#[derive(Parser)]
#[command(name = "costlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Config file (default: ~/.costlens/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Resolve periods relative to this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze costs for a period, e.g. "May", "last month", "2025-05-14"
    Analyze(AnalyzeArgs),

    /// Show how a query resolves to a period
    Period {
        /// Free-text period query
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a cost API error message
    Classify {
        /// Error message from the cost API
        message: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Free-text period query
    query: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Number of dimensions listed in the summary
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Percentage change below which the trend is stable
    #[arg(long, value_name = "PCT")]
    threshold: Option<f64>,

    /// Cost report endpoint URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Dimension to group costs by (e.g. SERVICE, LINKED_ACCOUNT)
    #[arg(long, value_name = "KEY")]
    group_by: Option<String>,

    /// Always fetch, even for settled periods
    #[arg(long)]
    no_cache: bool,
}

impl AnalyzeArgs {
    /// Flags override the config file
    fn apply(&self, config: &mut Config) {
        if let Some(top) = self.top {
            config.summary_top_n = top;
        }
        if let Some(threshold) = self.threshold {
            config.trend_threshold = threshold;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(group_by) = &self.group_by {
            config.group_by = group_by.clone();
        }
        if self.no_cache {
            config.cache_enabled = false;
        }
    }
}

/// Install the stderr log subscriber, falling back to plain warnings
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("costlens=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("costlens=warn"))
    };

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("[costlens] Warning: structured logging unavailable: {}", e);
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        init_logging(self.verbose);
        let today = self.as_of.unwrap_or_else(|| Local::now().date_naive());

        match self.command {
            Commands::Analyze(args) => {
                let mut config = match &self.config {
                    Some(path) => Config::load_from(path)?,
                    None => Config::load()?,
                };
                args.apply(&mut config);
                config.validate()?;
                run_analyze(&config, &args.query, args.json, today)
            }
            Commands::Period { query, json } => {
                let resolution = PeriodResolver::new().resolve(&query, today);
                let previous = resolution.period.previous();
                if json {
                    let value = serde_json::json!({
                        "period": resolution.period,
                        "previous_period": previous,
                        "resolved_by": resolution.rule,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    println!("Period:          {}", resolution.period);
                    println!("Previous period: {}", previous);
                    println!("Resolved by:     {}", resolution.rule);
                }
                Ok(())
            }
            Commands::Classify { message, json } => {
                let failure = FetchFailure::from_error(&FetchError::new(message));
                if json {
                    println!("{}", serde_json::to_string_pretty(&failure)?);
                } else {
                    print_failure(&failure);
                }
                Ok(())
            }
        }
    }
}

fn build_source(config: &Config, today: NaiveDate) -> anyhow::Result<Box<dyn CostSource>> {
    let endpoint = config.endpoint.as_deref().context(
        "No cost endpoint configured. Pass --endpoint or set \"endpoint\" in ~/.costlens/config.json",
    )?;
    let http = HttpCostSource::new(endpoint, config.request_timeout_secs)?;

    if !config.cache_enabled {
        return Ok(Box::new(http));
    }
    match ReportCacheService::new(endpoint) {
        Ok(cache) => Ok(Box::new(CachingCostSource::new(http, cache, today))),
        Err(e) => {
            tracing::warn!(error = %e, "report cache unavailable");
            Ok(Box::new(http))
        }
    }
}

fn run_analyze(config: &Config, query: &str, json: bool, today: NaiveDate) -> anyhow::Result<()> {
    let service = CostAnalysisService::new(build_source(config, today)?, config);
    let outcome = service.analyze(query, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome {
            AnalysisOutcome::Success(analysis) => print_analysis(analysis),
            AnalysisOutcome::Failure(failure) => print_failure(failure),
        }
    }

    if let AnalysisOutcome::Failure(failure) = outcome {
        anyhow::bail!("cost fetch failed ({:?})", failure.category);
    }
    Ok(())
}

fn print_analysis(analysis: &CostAnalysis) {
    let comparison = &analysis.comparison;
    println!("{}", comparison.summary_text);
    println!();

    for d in &comparison.dimensions {
        let change = d
            .change_from_previous
            .map(|c| format!("{:+.2}%", c))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<48} {:>12.2} {}  {:>6.2}%  {:>9}",
            d.name, d.amount, comparison.currency, d.share_of_total, change
        );
    }

    if !analysis.optimization_hints.is_empty() {
        println!();
        println!("Optimization hints:");
        for hint in &analysis.optimization_hints {
            println!("  - {}", hint);
        }
    }
}

fn print_failure(failure: &FetchFailure) {
    println!("Error ({:?}): {}", failure.category, failure.explanation);
    println!("  {}", failure.message);
    println!("Suggestions:");
    for suggestion in &failure.suggestions {
        println!("  - {}", suggestion);
    }
    println!("Retryable: {}", if failure.retryable { "yes" } else { "no" });
}
