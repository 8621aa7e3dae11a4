//! Shared Coverage Capability
//!
//! Every level of the coverage tree (project, class, line, jump, switch)
//! answers the same questions: how many lines and branch outcomes exist, how
//! many were exercised, and how to fold another snapshot of the same entity
//! into this one.

use serde::{Deserialize, Serialize};

/// Capability implemented by every coverage entity
///
/// `merge` takes `&self` because counters are atomics and registries are
/// copy-on-write: a tree can be merged into while other threads hold
/// handles into it.
pub trait CoverageData {
    /// Fold `other` into `self`
    ///
    /// Counters add, entries only present in `other` are copied in with their
    /// current counts, nothing is ever removed and no counter ever decreases.
    /// `self` never ends up sharing a record with `other`.
    fn merge(&self, other: &Self);

    /// Number of branch outcomes registered
    fn valid_branches(&self) -> u64;

    /// Number of branch outcomes with a non-zero counter
    fn covered_branches(&self) -> u64;

    /// Number of registered lines
    fn valid_lines(&self) -> u64 {
        0
    }

    /// Number of lines executed at least once
    fn covered_lines(&self) -> u64 {
        0
    }

    /// Fraction of branch outcomes covered, `1.0` when there are none
    fn branch_coverage_rate(&self) -> f64 {
        rate(self.covered_branches(), self.valid_branches())
    }

    /// Fraction of lines covered, `1.0` when there are none
    fn line_coverage_rate(&self) -> f64 {
        rate(self.covered_lines(), self.valid_lines())
    }

    /// Snapshot of all counts and rates
    fn summary(&self) -> CoverageSummary {
        CoverageSummary::from_counts(
            self.valid_lines(),
            self.covered_lines(),
            self.valid_branches(),
            self.covered_branches(),
        )
    }
}

/// Coverage summary statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Registered lines
    pub valid_lines: u64,
    /// Lines hit at least once
    pub covered_lines: u64,
    /// Registered branch outcomes
    pub valid_branches: u64,
    /// Branch outcomes hit at least once
    pub covered_branches: u64,
    /// `covered_lines / valid_lines`
    pub line_rate: f64,
    /// `covered_branches / valid_branches`
    pub branch_rate: f64,
}

impl CoverageSummary {
    /// Build a summary from raw counts
    #[must_use]
    pub fn from_counts(
        valid_lines: u64,
        covered_lines: u64,
        valid_branches: u64,
        covered_branches: u64,
    ) -> Self {
        Self {
            valid_lines,
            covered_lines,
            valid_branches,
            covered_branches,
            line_rate: rate(covered_lines, valid_lines),
            branch_rate: rate(covered_branches, valid_branches),
        }
    }

    /// Add the counts of another summary and recompute the rates
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self::from_counts(
            self.valid_lines + other.valid_lines,
            self.covered_lines + other.covered_lines,
            self.valid_branches + other.valid_branches,
            self.covered_branches + other.covered_branches,
        )
    }
}

impl Default for CoverageSummary {
    fn default() -> Self {
        Self::from_counts(0, 0, 0, 0)
    }
}

impl std::iter::Sum for CoverageSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::combine)
    }
}

/// Coverage ratio with the empty case counted as fully covered
#[must_use]
pub(crate) fn rate(covered: u64, valid: u64) -> f64 {
    if valid == 0 {
        return 1.0; // Vacuously true
    }
    covered as f64 / valid as f64
}
