//! Report caching for settled periods
//!
//! Cost data for a period keeps changing for a few days after it ends.
//! Once settled, a report never changes, so it is cached on disk and
//! served without another (billed) API request.

use chrono::{Duration, NaiveDate};
use directories::BaseDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::services::CostSource;
use crate::types::{CacheWarning, CostQuery, CostlensError, FetchError, RawCostReport, Result};

/// Bump when the on-disk layout changes
const CACHE_VERSION: u32 = 1;

/// Days after a period ends before its report is considered final
pub const SETTLE_DAYS: i64 = 3;

#[derive(Debug, Serialize, Deserialize)]
pub struct CachedReport {
    pub version: u32,
    pub key: String,
    pub cached_at: i64,
    pub report: RawCostReport,
}

/// Report cache for one upstream; `scope` (the endpoint) keeps accounts apart
pub struct ReportCacheService {
    cache_dir: PathBuf,
    scope: String,
}

impl ReportCacheService {
    pub fn new(scope: &str) -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| CostlensError::Cache("Cannot determine home directory".into()))?;
        let cache_dir = base_dirs.home_dir().join(".costlens").join("cache");
        fs::create_dir_all(&cache_dir)?;
        Ok(Self::with_cache_dir(cache_dir, scope))
    }

    pub fn with_cache_dir(cache_dir: PathBuf, scope: &str) -> Self {
        Self {
            cache_dir,
            scope: sanitize(scope),
        }
    }

    /// Stable key for a query: scope, period, grouping and metric
    pub fn cache_key(&self, query: &CostQuery) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.scope,
            query.period.start().format("%Y%m%d"),
            query.period.end().format("%Y%m%d"),
            sanitize(&query.group_by),
            sanitize(&query.metric)
        )
    }

    pub fn cache_path(&self, query: &CostQuery) -> PathBuf {
        self.cache_dir
            .join(format!("{}.json", self.cache_key(query)))
    }

    /// True once the period ended at least `SETTLE_DAYS` before `today`
    pub fn is_settled(query: &CostQuery, today: NaiveDate) -> bool {
        query.period.end() + Duration::days(SETTLE_DAYS) <= today
    }

    /// Load a cached report. `Ok(None)` on a miss.
    /// Uses shared file lock for concurrent read safety.
    pub fn load(
        &self,
        query: &CostQuery,
    ) -> std::result::Result<Option<RawCostReport>, CacheWarning> {
        let path = self.cache_path(query);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)
            .map_err(|e| CacheWarning::LoadFailed(format!("Failed to open cache: {}", e)))?;

        file.lock_shared().map_err(|e| {
            CacheWarning::LoadFailed(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();
        read.map_err(|e| CacheWarning::LoadFailed(format!("Failed to read cache: {}", e)))?;

        let cached: CachedReport = serde_json::from_str(&content)
            .map_err(|e| CacheWarning::Corrupted(format!("Corrupted cache file: {}", e)))?;

        if cached.version != CACHE_VERSION {
            return Err(CacheWarning::VersionMismatch(format!(
                "Cache version {} (expected {})",
                cached.version, CACHE_VERSION
            )));
        }

        Ok(Some(cached.report))
    }

    /// Save using atomic write (temp file + rename) with exclusive lock.
    pub fn save(&self, query: &CostQuery, report: &RawCostReport) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let cached = CachedReport {
            version: CACHE_VERSION,
            key: self.cache_key(query),
            cached_at: chrono::Utc::now().timestamp(),
            report: report.clone(),
        };

        let content = serde_json::to_string_pretty(&cached)
            .map_err(|e| CostlensError::Cache(format!("Serialization failed: {}", e)))?;

        let path = self.cache_path(query);
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path)
                .map_err(|e| CostlensError::Cache(format!("Failed to create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| CostlensError::Cache(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| CostlensError::Cache(format!("Failed to sync temp file: {}", e)))?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target
            .lock_exclusive()
            .map_err(|e| CostlensError::Cache(format!("Failed to acquire write lock: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| CostlensError::Cache(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        Ok(())
    }

    pub fn clear(&self, query: &CostQuery) -> Result<()> {
        let path = self.cache_path(query);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Wraps a source, serving settled periods from the report cache.
///
/// Cache problems are logged and fall through to the inner source.
pub struct CachingCostSource<S> {
    inner: S,
    cache: ReportCacheService,
    today: NaiveDate,
}

impl<S: CostSource> CachingCostSource<S> {
    pub fn new(inner: S, cache: ReportCacheService, today: NaiveDate) -> Self {
        Self {
            inner,
            cache,
            today,
        }
    }
}

impl<S: CostSource> CostSource for CachingCostSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, query: &CostQuery) -> std::result::Result<RawCostReport, FetchError> {
        if !ReportCacheService::is_settled(query, self.today) {
            return self.inner.fetch(query);
        }

        match self.cache.load(query) {
            Ok(Some(report)) => {
                debug!(period = %query.period, "report cache hit");
                return Ok(report);
            }
            Ok(None) => {}
            Err(warning) => warn!(?warning, period = %query.period, "ignoring report cache"),
        }

        let report = self.inner.fetch(query)?;
        if report.is_estimated() {
            debug!(period = %query.period, "estimated report, not caching");
        } else if let Err(e) = self.cache.save(query, &report) {
            warn!(error = %e, "failed to write report cache");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MetricValue, Period, ResultByTime};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const ENDPOINT: &str = "https://billing.example.com/costs";

    struct CountingSource {
        calls: AtomicUsize,
        estimated: bool,
    }

    impl CostSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch(&self, _query: &CostQuery) -> std::result::Result<RawCostReport, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut report = sample_report();
            report.results_by_time[0].estimated = self.estimated;
            Ok(report)
        }
    }

    fn sample_report() -> RawCostReport {
        RawCostReport {
            results_by_time: vec![ResultByTime {
                total: HashMap::from([(
                    "UnblendedCost".to_string(),
                    MetricValue::new("42.00", "USD"),
                )]),
                ..ResultByTime::default()
            }],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn may_query() -> CostQuery {
        CostQuery::monthly(Period::month(2025, 5).unwrap(), "SERVICE", "UnblendedCost")
    }

    fn create_test_service() -> (ReportCacheService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = ReportCacheService::with_cache_dir(temp_dir.path().to_path_buf(), ENDPOINT);
        (service, temp_dir)
    }

    fn caching(today: NaiveDate) -> (CachingCostSource<CountingSource>, TempDir) {
        let (cache, temp) = create_test_service();
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            estimated: false,
        };
        (CachingCostSource::new(source, cache, today), temp)
    }

    // ========== Keys and settlement ==========

    #[test]
    fn test_cache_key() {
        let (service, _temp) = create_test_service();
        let query = CostQuery::monthly(
            Period::month(2025, 5).unwrap(),
            "LINKED_ACCOUNT",
            "UnblendedCost",
        );
        assert_eq!(
            service.cache_key(&query),
            "https---billing-example-com-costs_20250501_20250531_LINKED-ACCOUNT_UnblendedCost"
        );
    }

    #[test]
    fn test_endpoints_do_not_share_entries() {
        let temp_dir = TempDir::new().unwrap();
        let first = ReportCacheService::with_cache_dir(temp_dir.path().to_path_buf(), ENDPOINT);
        let second = ReportCacheService::with_cache_dir(
            temp_dir.path().to_path_buf(),
            "https://other.example.com/costs",
        );

        first.save(&may_query(), &sample_report()).unwrap();
        assert_ne!(first.cache_path(&may_query()), second.cache_path(&may_query()));
        assert_eq!(second.load(&may_query()), Ok(None));
    }

    #[test]
    fn test_is_settled_boundary() {
        let query = may_query();
        assert!(!ReportCacheService::is_settled(&query, date(2025, 6, 2)));
        assert!(ReportCacheService::is_settled(&query, date(2025, 6, 3)));
    }

    // ========== load / save ==========

    #[test]
    fn test_load_miss() {
        let (service, _temp) = create_test_service();
        assert_eq!(service.load(&may_query()), Ok(None));
    }

    #[test]
    fn test_save_then_load() {
        let (service, _temp) = create_test_service();
        service.save(&may_query(), &sample_report()).unwrap();
        assert_eq!(service.load(&may_query()), Ok(Some(sample_report())));
    }

    #[test]
    fn test_corrupted_cache_warns() {
        let (service, _temp) = create_test_service();
        let path = service.cache_path(&may_query());
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            service.load(&may_query()),
            Err(CacheWarning::Corrupted(_))
        ));
    }

    #[test]
    fn test_version_mismatch_warns() {
        let (service, _temp) = create_test_service();
        let stale = CachedReport {
            version: CACHE_VERSION + 1,
            key: service.cache_key(&may_query()),
            cached_at: 0,
            report: sample_report(),
        };
        fs::write(
            service.cache_path(&may_query()),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            service.load(&may_query()),
            Err(CacheWarning::VersionMismatch(_))
        ));
    }

    #[test]
    fn test_clear() {
        let (service, _temp) = create_test_service();
        service.save(&may_query(), &sample_report()).unwrap();
        service.clear(&may_query()).unwrap();
        assert_eq!(service.load(&may_query()), Ok(None));
        // Clearing again is fine
        service.clear(&may_query()).unwrap();
    }

    // ========== CachingCostSource ==========

    #[test]
    fn test_settled_period_fetched_once() {
        let (source, _temp) = caching(date(2025, 7, 1));
        let query = may_query();

        assert_eq!(source.fetch(&query).unwrap(), sample_report());
        assert_eq!(source.fetch(&query).unwrap(), sample_report());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_open_period_never_cached() {
        let (source, _temp) = caching(date(2025, 5, 20));
        let query = may_query();

        source.fetch(&query).unwrap();
        source.fetch(&query).unwrap();
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
        assert!(!source.cache.cache_path(&query).exists());
    }

    #[test]
    fn test_estimated_report_not_cached() {
        let (cache, _temp) = create_test_service();
        let inner = CountingSource {
            calls: AtomicUsize::new(0),
            estimated: true,
        };
        let source = CachingCostSource::new(inner, cache, date(2025, 7, 1));
        let query = may_query();

        source.fetch(&query).unwrap();
        source.fetch(&query).unwrap();
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
        assert!(!source.cache.cache_path(&query).exists());
    }

    #[test]
    fn test_corrupted_entry_refetched_and_repaired() {
        let (source, _temp) = caching(date(2025, 7, 1));
        let query = may_query();
        fs::write(source.cache.cache_path(&query), "garbage").unwrap();

        assert_eq!(source.fetch(&query).unwrap(), sample_report());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.cache.load(&query), Ok(Some(sample_report())));
    }
}
