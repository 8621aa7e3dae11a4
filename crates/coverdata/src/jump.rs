//! Binary Branch Counters
//!
//! A jump is a two-way conditional on one line. Each direction is counted on
//! its own so partially exercised conditions show up as half covered.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::data::CoverageData;
use crate::ids::BranchId;

/// Taken / not-taken counters for one conditional jump
#[derive(Debug)]
pub struct JumpData {
    branch_id: BranchId,
    true_hits: AtomicU64,
    false_hits: AtomicU64,
}

impl JumpData {
    /// Create a jump with both counters at zero
    #[must_use]
    pub const fn new(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            true_hits: AtomicU64::new(0),
            false_hits: AtomicU64::new(0),
        }
    }

    /// Local id of this jump on its line
    #[inline]
    #[must_use]
    pub const fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Record `hits` executions going the `outcome` way
    #[inline]
    pub fn touch(&self, outcome: bool, hits: u64) {
        let counter = if outcome {
            &self.true_hits
        } else {
            &self.false_hits
        };
        counter.fetch_add(hits, Ordering::Relaxed);
    }

    /// Times the condition evaluated to true
    #[inline]
    #[must_use]
    pub fn true_hits(&self) -> u64 {
        self.true_hits.load(Ordering::Relaxed)
    }

    /// Times the condition evaluated to false
    #[inline]
    #[must_use]
    pub fn false_hits(&self) -> u64 {
        self.false_hits.load(Ordering::Relaxed)
    }

    /// Independent copy of the current counts
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            branch_id: self.branch_id,
            true_hits: AtomicU64::new(self.true_hits()),
            false_hits: AtomicU64::new(self.false_hits()),
        }
    }
}

impl CoverageData for JumpData {
    fn merge(&self, other: &Self) {
        // Load first: `other` may be `self`.
        let (true_hits, false_hits) = (other.true_hits(), other.false_hits());
        self.true_hits.fetch_add(true_hits, Ordering::Relaxed);
        self.false_hits.fetch_add(false_hits, Ordering::Relaxed);
    }

    fn valid_branches(&self) -> u64 {
        2
    }

    fn covered_branches(&self) -> u64 {
        u64::from(self.true_hits() > 0) + u64::from(self.false_hits() > 0)
    }
}

impl PartialEq for JumpData {
    fn eq(&self, other: &Self) -> bool {
        self.branch_id == other.branch_id
            && self.true_hits() == other.true_hits()
            && self.false_hits() == other.false_hits()
    }
}

impl Eq for JumpData {}
