//! N+1 query detection.
//!
//! Resolving a relationship lazily inside a loop issues one query per
//! record. The detector counts lazy loads per relationship and warns once a
//! relationship reaches the threshold, pointing at `Loader::eager_load`.
//!
//! ```
//! use relmodel_loader::N1Detector;
//!
//! let mut detector = N1Detector::new(3);
//! for _ in 0..3 {
//!     detector.record_load("author");
//! }
//! assert_eq!(detector.count_for("author"), 3);
//! assert_eq!(detector.stats().potential_n1, 1);
//! ```

use std::collections::HashMap;

/// Where a lazy load was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub relationship: String,
    pub file: &'static str,
    pub line: u32,
}

/// Summary of recorded lazy loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct N1Stats {
    /// Total number of lazy loads recorded
    pub total_loads: usize,
    /// Number of distinct relationships loaded
    pub relationships_loaded: usize,
    /// Number of relationships at or above the threshold
    pub potential_n1: usize,
}

/// Counts lazy loads per relationship name.
#[derive(Debug, Clone)]
pub struct N1Detector {
    counts: HashMap<String, usize>,
    threshold: usize,
    call_sites: Vec<CallSite>,
}

impl N1Detector {
    /// Call sites kept per relationship for the warning.
    const SITES_LOGGED: usize = 5;

    pub fn new(threshold: usize) -> Self {
        Self {
            counts: HashMap::new(),
            threshold: threshold.max(1),
            call_sites: Vec::new(),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Record one lazy load of `relationship`.
    ///
    /// The warning fires once, when the count reaches the threshold. Only the
    /// first few call sites per relationship are kept.
    #[track_caller]
    pub fn record_load(&mut self, relationship: &str) {
        let count = {
            let count = self.counts.entry(relationship.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if count <= Self::SITES_LOGGED {
            let caller = std::panic::Location::caller();
            self.call_sites.push(CallSite {
                relationship: relationship.to_string(),
                file: caller.file(),
                line: caller.line(),
            });
        }

        if count == self.threshold {
            self.emit_warning(relationship, count);
        }
    }

    fn emit_warning(&self, relationship: &str, count: usize) {
        tracing::warn!(
            target: "relmodel::n1",
            relationship = relationship,
            queries = count,
            threshold = self.threshold,
            "N+1 query pattern detected; resolve this relationship with Loader::eager_load"
        );

        let sites = self
            .call_sites
            .iter()
            .filter(|s| s.relationship == relationship);
        for (i, site) in sites.enumerate() {
            tracing::debug!(
                target: "relmodel::n1",
                index = i,
                file = site.file,
                line = site.line,
                "  [{}] {}:{}",
                i,
                site.file,
                site.line
            );
        }
    }

    /// Clear all counts and call sites, e.g. at the start of a request.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.call_sites.clear();
    }

    pub fn count_for(&self, relationship: &str) -> usize {
        self.counts.get(relationship).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> N1Stats {
        N1Stats {
            total_loads: self.counts.values().sum(),
            relationships_loaded: self.counts.len(),
            potential_n1: self
                .counts
                .values()
                .filter(|&&c| c >= self.threshold)
                .count(),
        }
    }

    pub fn call_sites(&self) -> &[CallSite] {
        &self.call_sites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_relationship() {
        let mut detector = N1Detector::new(2);
        detector.record_load("author");
        detector.record_load("author");
        detector.record_load("comments");

        assert_eq!(detector.count_for("author"), 2);
        assert_eq!(detector.count_for("comments"), 1);
        assert_eq!(detector.count_for("tags"), 0);
        assert_eq!(
            detector.stats(),
            N1Stats {
                total_loads: 3,
                relationships_loaded: 2,
                potential_n1: 1,
            }
        );
    }

    #[test]
    fn test_call_sites_point_at_caller() {
        let mut detector = N1Detector::new(3);
        detector.record_load("author");
        let line = line!() - 1;

        let site = &detector.call_sites()[0];
        assert_eq!(site.relationship, "author");
        assert!(site.file.ends_with("n1_detection.rs"));
        assert_eq!(site.line, line);
    }

    #[test]
    fn test_call_sites_capped_per_relationship() {
        let mut detector = N1Detector::new(3);
        for _ in 0..50 {
            detector.record_load("author");
        }
        detector.record_load("comments");

        assert_eq!(detector.count_for("author"), 50);
        let authors = detector
            .call_sites()
            .iter()
            .filter(|s| s.relationship == "author")
            .count();
        assert_eq!(authors, N1Detector::SITES_LOGGED);
        assert_eq!(detector.call_sites().len(), N1Detector::SITES_LOGGED + 1);
        assert_eq!(detector.call_sites().last().unwrap().relationship, "comments");
    }

    #[test]
    fn test_reset() {
        let mut detector = N1Detector::new(1);
        detector.record_load("author");
        detector.reset();
        assert_eq!(detector.stats(), N1Stats::default());
        assert!(detector.call_sites().is_empty());
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        assert_eq!(N1Detector::new(0).threshold(), 1);
    }
}
