//! Per-Line Coverage
//!
//! One [`LineData`] per registered source line. Instrumented code usually
//! keeps the `Arc<LineData>` returned by registration and touches it
//! directly, which skips the class-level map lookup entirely.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::data::CoverageData;
use crate::ids::{BranchId, LineNumber};
use crate::jump::JumpData;
use crate::registry::Registry;
use crate::switch::SwitchData;

/// Method a line belongs to, as reported by the instrumentation step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Method signature descriptor
    pub descriptor: String,
}

/// Execution counter and branch counters for one source line
#[derive(Debug)]
pub struct LineData {
    line_number: LineNumber,
    method: Option<MethodInfo>,
    hits: AtomicU64,
    jumps: Registry<BranchId, JumpData>,
    switches: Registry<BranchId, SwitchData>,
}

impl LineData {
    /// Create a line with a zero hit count and no branches
    #[must_use]
    pub fn new(line_number: LineNumber) -> Self {
        Self {
            line_number,
            method: None,
            hits: AtomicU64::new(0),
            jumps: Registry::default(),
            switches: Registry::default(),
        }
    }

    /// Create a line that records the method it belongs to
    #[must_use]
    pub fn with_method(
        line_number: LineNumber,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            method: Some(MethodInfo {
                name: name.into(),
                descriptor: descriptor.into(),
            }),
            ..Self::new(line_number)
        }
    }

    /// Line number within the owning class
    #[inline]
    #[must_use]
    pub const fn line_number(&self) -> LineNumber {
        self.line_number
    }

    /// Method this line belongs to, if known
    #[must_use]
    pub fn method(&self) -> Option<&MethodInfo> {
        self.method.as_ref()
    }

    /// Times this line was executed
    #[inline]
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Record `hits` executions of this line
    #[inline]
    pub fn touch(&self, hits: u64) {
        self.hits.fetch_add(hits, Ordering::Relaxed);
    }

    /// Record a jump outcome, `false` if the jump was never registered
    #[inline]
    #[must_use]
    pub fn touch_jump(&self, branch: BranchId, outcome: bool, hits: u64) -> bool {
        self.jumps
            .with(&branch, |jump| jump.touch(outcome, hits))
            .is_some()
    }

    /// Record a switch case, `false` if the switch was never registered
    #[inline]
    #[must_use]
    pub fn touch_switch(&self, switch: BranchId, case: i32, hits: u64) -> bool {
        self.switches
            .with(&switch, |data| data.touch(case, hits))
            .is_some()
    }

    /// Insert a jump if absent; the flag is `true` when it was created
    pub(crate) fn add_jump(&self, branch: BranchId) -> (Arc<JumpData>, bool) {
        self.jumps
            .get_or_insert_with(branch, || Arc::new(JumpData::new(branch)))
    }

    /// Insert a switch if absent, otherwise widen it to `case_count` cases
    pub(crate) fn add_switch(
        &self,
        switch: BranchId,
        case_count: usize,
    ) -> (Arc<SwitchData>, bool) {
        let (data, created) = self
            .switches
            .get_or_insert_with(switch, || Arc::new(SwitchData::new(switch, case_count)));
        if !created {
            data.ensure_cases(case_count);
        }
        (data, created)
    }

    /// Registered jump with this id
    #[must_use]
    pub fn jump(&self, branch: BranchId) -> Option<Arc<JumpData>> {
        self.jumps.get(&branch)
    }

    /// Registered switch with this id
    #[must_use]
    pub fn switch(&self, switch: BranchId) -> Option<Arc<SwitchData>> {
        self.switches.get(&switch)
    }

    /// Registered jump ids in ascending order
    #[must_use]
    pub fn jump_ids(&self) -> Vec<BranchId> {
        self.jumps.keys()
    }

    /// Registered switch ids in ascending order
    #[must_use]
    pub fn switch_ids(&self) -> Vec<BranchId> {
        self.switches.keys()
    }

    /// Whether any jump or switch is registered on this line
    #[must_use]
    pub fn is_branching(&self) -> bool {
        !self.jumps.is_empty() || !self.switches.is_empty()
    }

    /// Independent copy of the current counts, branches included
    pub(crate) fn snapshot(&self) -> Self {
        let jumps = self
            .jumps
            .entries()
            .iter()
            .map(|(id, jump)| (*id, Arc::new(jump.snapshot())))
            .collect();
        let switches = self
            .switches
            .entries()
            .iter()
            .map(|(id, data)| (*id, Arc::new(data.snapshot())))
            .collect();

        Self {
            line_number: self.line_number,
            method: self.method.clone(),
            hits: AtomicU64::new(self.hits()),
            jumps: Registry::from_entries(jumps),
            switches: Registry::from_entries(switches),
        }
    }

    /// Point-in-time view used by reports
    #[must_use]
    pub fn to_summary(&self) -> LineSummary {
        let branch = self.is_branching();
        let valid_branches = self.valid_branches();
        let covered_branches = self.covered_branches();
        let condition_coverage = branch.then(|| {
            let percent = (self.branch_coverage_rate() * 100.0).round() as u64;
            format!("{percent}% ({covered_branches}/{valid_branches})")
        });

        LineSummary {
            line_number: self.line_number,
            hits: self.hits(),
            method_name: self.method.as_ref().map(|m| m.name.clone()),
            branch,
            valid_branches,
            covered_branches,
            condition_coverage,
        }
    }
}

impl CoverageData for LineData {
    fn merge(&self, other: &Self) {
        self.touch(other.hits());
        self.jumps.absorb(&other.jumps, JumpData::snapshot);
        self.switches.absorb(&other.switches, SwitchData::snapshot);
    }

    fn valid_branches(&self) -> u64 {
        let jumps: u64 = self.jumps.entries().values().map(|j| j.valid_branches()).sum();
        let switches: u64 = self
            .switches
            .entries()
            .values()
            .map(|s| s.valid_branches())
            .sum();
        jumps + switches
    }

    fn covered_branches(&self) -> u64 {
        let jumps: u64 = self.jumps.entries().values().map(|j| j.covered_branches()).sum();
        let switches: u64 = self
            .switches
            .entries()
            .values()
            .map(|s| s.covered_branches())
            .sum();
        jumps + switches
    }

    fn valid_lines(&self) -> u64 {
        1
    }

    fn covered_lines(&self) -> u64 {
        u64::from(self.hits() > 0)
    }
}

impl PartialEq for LineData {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.line_number == other.line_number
            && self.method == other.method
            && self.hits() == other.hits()
            && *self.jumps.entries() == *other.jumps.entries()
            && *self.switches.entries() == *other.switches.entries()
    }
}

impl Eq for LineData {}

/// Per-line coverage information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSummary {
    /// Line number
    pub line_number: LineNumber,
    /// Number of times this line was executed
    pub hits: u64,
    /// Method containing this line
    pub method_name: Option<String>,
    /// Whether the line carries jumps or switches
    pub branch: bool,
    /// Registered branch outcomes on this line
    pub valid_branches: u64,
    /// Branch outcomes hit at least once
    pub covered_branches: u64,
    /// Cobertura-style condition coverage, e.g. `"50% (1/2)"`
    pub condition_coverage: Option<String>,
}
