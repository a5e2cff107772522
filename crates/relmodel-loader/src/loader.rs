//! The loader façade.
//!
//! `Loader` is the single entry point for relationship resolution. It owns
//! a fetcher and a configuration and dispatches on the descriptor's kind.

use crate::batch;
use crate::config::LoaderConfig;
use crate::lazy;
use crate::n1_detection::{N1Detector, N1Stats};
use crate::report::{LazyResult, LoadReport};
use relmodel_core::{Record, Relationship, Result, RowFetcher};

/// Resolves relationships for records through a `RowFetcher`.
///
/// # Example
///
/// ```
/// use relmodel_core::{Record, Relationship, Row, Value};
/// use relmodel_loader::{Loader, MemoryStore};
///
/// let store = MemoryStore::new().with_rows(
///     "authors",
///     [Row::from_pairs([("id", Value::BigInt(5)), ("name", Value::from("Ada"))])],
/// );
/// let mut loader = Loader::new(store);
///
/// let mut posts: Vec<Row> = (0..3)
///     .map(|i| Row::from_pairs([("id", Value::BigInt(i)), ("author_id", Value::BigInt(5))]))
///     .collect();
/// let author = Relationship::belongs_to("author", "authors", "author_id", "id");
///
/// let report = loader.eager_load(&mut posts, &author).unwrap();
/// assert_eq!(report.queries, 1);
/// assert_eq!(report.assigned, 3);
/// assert!(matches!(posts[2].get_field("author"), Some(Value::Record(_))));
/// ```
#[derive(Debug)]
pub struct Loader<F> {
    fetcher: F,
    config: LoaderConfig,
    n1: Option<N1Detector>,
}

impl<F: RowFetcher> Loader<F> {
    /// Create a loader with the default configuration.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            config: LoaderConfig::default(),
            n1: None,
        }
    }

    /// Create a loader with an explicit configuration.
    #[allow(clippy::result_large_err)]
    pub fn with_config(fetcher: F, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        let n1 = config.n1_threshold.map(N1Detector::new);
        Ok(Self {
            fetcher,
            config,
            n1,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    pub fn into_inner(self) -> F {
        self.fetcher
    }

    /// Resolve `relationship` for every record in one batched operation.
    ///
    /// Issues one fetch per distinct-key batch (two for many-to-many) and
    /// none when no record carries a usable key. A malformed descriptor
    /// fails before any fetch. A fetch error is returned unchanged and
    /// leaves all records untouched. Records that cannot take the resolved
    /// value are listed in the report's warnings.
    #[tracing::instrument(
        level = "debug",
        skip(self, records, relationship),
        fields(
            relationship = %relationship.name(),
            kind = %relationship.kind(),
            records = records.len()
        )
    )]
    #[allow(clippy::result_large_err)]
    pub fn eager_load<R: Record>(
        &mut self,
        records: &mut [R],
        relationship: &Relationship,
    ) -> Result<LoadReport> {
        relationship.validate()?;

        let mut report = LoadReport::new(relationship, records.len());
        let fetcher = &mut self.fetcher;
        let config = &self.config;

        match relationship {
            Relationship::BelongsTo(rel) => {
                batch::belongs_to(fetcher, records, rel, config, &mut report)?;
            }
            Relationship::HasOne(rel) => {
                batch::has_one(fetcher, records, rel, config, &mut report)?;
            }
            Relationship::HasMany(rel) => {
                batch::has_many(fetcher, records, rel, config, &mut report)?;
            }
            Relationship::BelongsToMany(rel) => {
                batch::belongs_to_many(fetcher, records, rel, config, &mut report)?;
            }
        }

        tracing::debug!(
            keys = report.keys,
            queries = report.queries,
            assigned = report.assigned,
            skipped = report.skipped,
            warnings = report.warnings.len(),
            "Batch load complete"
        );
        Ok(report)
    }

    /// Resolve `relationship` for a single record and write it back.
    ///
    /// A record whose key is zero or missing resolves to `None` without a
    /// fetch. Each call that fetches counts toward N+1 detection when it is
    /// enabled.
    #[track_caller]
    #[allow(clippy::result_large_err)]
    pub fn lazy_load<R: Record + ?Sized>(
        &mut self,
        record: &mut R,
        relationship: &Relationship,
    ) -> Result<LazyResult> {
        let span = tracing::debug_span!(
            "lazy_load",
            relationship = %relationship.name(),
            kind = %relationship.kind()
        );
        let _guard = span.enter();

        relationship.validate()?;

        let mut report = LoadReport::new(relationship, 1);
        let value = lazy::resolve(
            &mut self.fetcher,
            record,
            relationship,
            &self.config,
            &mut report,
        )?;

        if let Some(detector) = self.n1.as_mut().filter(|_| report.queries > 0) {
            detector.record_load(relationship.name());
        }

        tracing::debug!(
            resolved = value.is_some(),
            queries = report.queries,
            "Lazy load complete"
        );
        Ok(LazyResult { value, report })
    }

    /// N+1 statistics, when detection is enabled.
    pub fn n1_stats(&self) -> Option<N1Stats> {
        self.n1.as_ref().map(N1Detector::stats)
    }

    pub fn n1_detector(&self) -> Option<&N1Detector> {
        self.n1.as_ref()
    }

    /// Clear N+1 counters, e.g. between requests.
    pub fn reset_n1(&mut self) {
        if let Some(detector) = self.n1.as_mut() {
            detector.reset();
        }
    }
}
