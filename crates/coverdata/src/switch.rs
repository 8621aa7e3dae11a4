//! N-Way Branch Counters
//!
//! A switch keeps one counter per case key plus a dedicated counter for the
//! default (no match) case. Case keys are mapped to dense indices by the
//! instrumentation step; any index outside the registered range, including
//! the [`SwitchData::DEFAULT_CASE`] sentinel, lands on the default counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::data::CoverageData;
use crate::ids::BranchId;
use crate::lock;

/// Per-case counters for one switch
#[derive(Debug)]
pub struct SwitchData {
    switch_id: BranchId,
    /// Grows on re-registration, never shrinks
    cases: RwLock<Vec<AtomicU64>>,
    default_hits: AtomicU64,
}

impl SwitchData {
    /// Case index the instrumentation passes for the default branch
    pub const DEFAULT_CASE: i32 = -1;

    /// Most case keys a registered switch may have
    pub const MAX_CASES: usize = 1 << 16;

    /// Create a switch with `case_count` zeroed case counters
    #[must_use]
    pub fn new(switch_id: BranchId, case_count: usize) -> Self {
        Self {
            switch_id,
            cases: RwLock::new(zeroed(case_count)),
            default_hits: AtomicU64::new(0),
        }
    }

    /// Local id of this switch on its line
    #[inline]
    #[must_use]
    pub const fn switch_id(&self) -> BranchId {
        self.switch_id
    }

    /// Make room for at least `case_count` cases, keeping existing counts
    pub(crate) fn ensure_cases(&self, case_count: usize) {
        if lock::read(&self.cases).len() >= case_count {
            return;
        }
        let mut cases = lock::write(&self.cases);
        let missing = case_count.saturating_sub(cases.len());
        cases.extend(zeroed(missing));
    }

    /// Record `hits` executions selecting `case`
    #[inline]
    pub fn touch(&self, case: i32, hits: u64) {
        let cases = lock::read(&self.cases);
        let counter = usize::try_from(case)
            .ok()
            .and_then(|idx| cases.get(idx))
            .unwrap_or(&self.default_hits);
        counter.fetch_add(hits, Ordering::Relaxed);
    }

    /// Number of registered case keys, excluding the default case
    #[must_use]
    pub fn case_count(&self) -> usize {
        lock::read(&self.cases).len()
    }

    /// Hits for one case, `None` outside the registered range
    #[must_use]
    pub fn case_hits(&self, case: usize) -> Option<u64> {
        lock::read(&self.cases)
            .get(case)
            .map(|c| c.load(Ordering::Relaxed))
    }

    /// Hits for every case in index order
    #[must_use]
    pub fn hits(&self) -> Vec<u64> {
        lock::read(&self.cases)
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Hits for the default case
    #[inline]
    #[must_use]
    pub fn default_hits(&self) -> u64 {
        self.default_hits.load(Ordering::Relaxed)
    }

    /// Independent copy of the current counts
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            switch_id: self.switch_id,
            cases: RwLock::new(self.hits().into_iter().map(AtomicU64::new).collect()),
            default_hits: AtomicU64::new(self.default_hits()),
        }
    }
}

fn zeroed(len: usize) -> Vec<AtomicU64> {
    std::iter::repeat_with(|| AtomicU64::new(0))
        .take(len)
        .collect()
}

impl CoverageData for SwitchData {
    fn merge(&self, other: &Self) {
        // Snapshot first: `other` may be `self`, and the write in
        // `ensure_cases` must not overlap a read guard on the same lock.
        let other_hits = other.hits();
        let other_default = other.default_hits();

        self.ensure_cases(other_hits.len());
        let cases = lock::read(&self.cases);
        for (counter, hits) in cases.iter().zip(other_hits) {
            counter.fetch_add(hits, Ordering::Relaxed);
        }
        self.default_hits.fetch_add(other_default, Ordering::Relaxed);
    }

    fn valid_branches(&self) -> u64 {
        self.case_count() as u64 + 1
    }

    fn covered_branches(&self) -> u64 {
        let covered_cases = lock::read(&self.cases)
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) > 0)
            .count() as u64;
        covered_cases + u64::from(self.default_hits() > 0)
    }
}

impl PartialEq for SwitchData {
    fn eq(&self, other: &Self) -> bool {
        self.switch_id == other.switch_id
            && self.default_hits() == other.default_hits()
            && self.hits() == other.hits()
    }
}

impl Eq for SwitchData {}
