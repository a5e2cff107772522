//! Loader configuration.

use relmodel_core::{ConfigError, Error, Result};
use serde::{Deserialize, Serialize};

/// How HasOne picks a row when several related rows share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the row with the lowest related primary key. Rows without a
    /// usable key lose to rows with one; remaining ties keep fetch order.
    #[default]
    LowestKey,
    /// Keep the first row the fetch returned.
    FirstFetched,
}

/// Settings shared by every resolution a `Loader` performs.
///
/// ```
/// use relmodel_loader::{LoaderConfig, TieBreak};
///
/// let config = LoaderConfig::from_json(r#"{"max_batch_size": 500, "n1_threshold": 3}"#).unwrap();
/// assert_eq!(config.max_batch_size, Some(500));
/// assert_eq!(config.tie_break, TieBreak::LowestKey);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Largest IN list sent in one fetch; longer key lists are split.
    /// `None` sends every key in a single fetch.
    pub max_batch_size: Option<usize>,
    pub tie_break: TieBreak,
    /// Warn once a relationship has been lazily loaded this many times.
    /// `None` disables N+1 detection.
    pub n1_threshold: Option<usize>,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split IN lists into chunks of at most `size` keys.
    #[must_use]
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Enable N+1 detection with the given threshold.
    #[must_use]
    pub fn with_n1_detection(mut self, threshold: usize) -> Self {
        self.n1_threshold = Some(threshold);
        self
    }

    /// Parse and validate a configuration from JSON.
    #[allow(clippy::result_large_err)]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoaderConfig = serde_json::from_str(json).map_err(|e| {
            Error::Config(ConfigError {
                message: format!("invalid loader configuration: {}", e),
                source: Some(Box::new(e)),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == Some(0) {
            return Err(Error::config("max_batch_size must be at least 1"));
        }
        if self.n1_threshold == Some(0) {
            return Err(Error::config("n1_threshold must be at least 1"));
        }
        Ok(())
    }
}
