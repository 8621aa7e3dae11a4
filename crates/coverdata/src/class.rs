//! Per-Class Coverage
//!
//! [`ClassData`] owns the line registry of one instrumented class and a
//! secondary index of the lines that carry jumps or switches. The index only
//! ever holds handles to lines that are already in the registry.
//!
//! # Concurrency
//!
//! Touches look the line up in the published registry map and update an
//! atomic, so any number of threads can record into the same class at once.
//! Registration and merge build a new map and publish it with a pointer
//! swap; a touch never waits for that work. Handles returned by
//! [`ClassData::add_line`] skip the lookup entirely and never take a lock.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::data::CoverageData;
use crate::ids::{BranchId, LineNumber};
use crate::jump::JumpData;
use crate::line::{LineData, LineSummary};
use crate::registry::Registry;
use crate::result::{CoverdataError, CoverdataResult};
use crate::switch::SwitchData;

/// Default separator between package and class name
pub const DEFAULT_PACKAGE_SEPARATOR: char = '.';

/// Coverage tree for one instrumented class
#[derive(Debug)]
pub struct ClassData {
    name: String,
    separator: char,
    lines: Registry<LineNumber, LineData>,
    /// Lines with jumps or switches; every key is also in `lines`
    branches: Registry<LineNumber, LineData>,
}

impl ClassData {
    /// Create an empty class with a `.`-separated fully-qualified name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_separator(name, DEFAULT_PACKAGE_SEPARATOR)
    }

    /// Create an empty class whose name uses `separator` between packages
    #[must_use]
    pub fn with_separator(name: impl Into<String>, separator: char) -> Self {
        Self {
            name: name.into(),
            separator,
            lines: Registry::default(),
            branches: Registry::default(),
        }
    }

    /// Fully-qualified class name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class name without its package
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name
            .rsplit_once(self.separator)
            .map_or(self.name.as_str(), |(_, base)| base)
    }

    /// Package part of the name, empty for the default package
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name
            .rsplit_once(self.separator)
            .map_or("", |(package, _)| package)
    }

    /// Order two classes by name alone
    ///
    /// Line contents never affect the order, so this is deliberately not an
    /// `Ord` impl: two classes can compare equal here and still differ.
    #[must_use]
    pub fn compare_name(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register `line`, returning the record already present if any
    pub fn add_line(&self, line: LineNumber) -> Arc<LineData> {
        self.add_line_data(LineData::new(line))
    }

    /// Register a pre-built line record; the first registration wins
    pub fn add_line_data(&self, data: LineData) -> Arc<LineData> {
        let line = data.line_number();
        let (record, created) = self.lines.get_or_insert_with(line, || Arc::new(data));
        if created {
            debug!(class = %self.name, %line, "registered line");
        } else {
            trace!(class = %self.name, %line, "line already registered");
        }
        record
    }

    /// Register a two-way jump on an already registered line
    pub fn add_line_jump(
        &self,
        line: LineNumber,
        branch: BranchId,
    ) -> CoverdataResult<Arc<JumpData>> {
        let data = self.registered_line(line)?;
        let (jump, created) = data.add_jump(branch);
        if created {
            debug!(class = %self.name, %line, %branch, "registered jump");
        }
        self.index_branch_line(line, data);
        Ok(jump)
    }

    /// Register a switch with one case per key on an already registered line
    pub fn add_line_switch(
        &self,
        line: LineNumber,
        switch: BranchId,
        keys: &[i32],
    ) -> CoverdataResult<Arc<SwitchData>> {
        self.register_switch(line, switch, keys.len() as u64)
    }

    /// Register a switch covering the contiguous keys `min..=max`
    pub fn add_line_switch_range(
        &self,
        line: LineNumber,
        switch: BranchId,
        min: i32,
        max: i32,
    ) -> CoverdataResult<Arc<SwitchData>> {
        if max < min {
            error!(class = %self.name, %line, min, max, "invalid switch range");
            return Err(CoverdataError::InvalidSwitchRange {
                class: self.name.clone(),
                line,
                min,
                max,
            });
        }
        let cases = (i64::from(max) - i64::from(min)).unsigned_abs() + 1;
        self.register_switch(line, switch, cases)
    }

    fn register_switch(
        &self,
        line: LineNumber,
        switch: BranchId,
        cases: u64,
    ) -> CoverdataResult<Arc<SwitchData>> {
        let case_count = usize::try_from(cases)
            .ok()
            .filter(|&count| count <= SwitchData::MAX_CASES)
            .ok_or_else(|| self.oversized_switch(line, switch, cases))?;
        let data = self.registered_line(line)?;
        let (switch_data, created) = data.add_switch(switch, case_count);
        if created {
            debug!(class = %self.name, %line, %switch, case_count, "registered switch");
        }
        self.index_branch_line(line, data);
        Ok(switch_data)
    }

    fn registered_line(&self, line: LineNumber) -> CoverdataResult<Arc<LineData>> {
        self.lines
            .get(&line)
            .ok_or_else(|| self.unregistered_line(line))
    }

    fn index_branch_line(&self, line: LineNumber, data: Arc<LineData>) {
        self.branches.get_or_insert_with(line, || data);
    }

    #[cfg(test)]
    pub(crate) fn hold_registration(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lines.hold_writer()
    }

    // ------------------------------------------------------------------
    // Touch (hot path)
    // ------------------------------------------------------------------

    /// Record `hits` executions of `line`
    #[inline]
    pub fn touch(&self, line: LineNumber, hits: u64) -> CoverdataResult<()> {
        self.lines
            .with(&line, |data| data.touch(hits))
            .ok_or_else(|| self.unregistered_line(line))
    }

    /// Record `hits` evaluations of a jump going the `outcome` way
    #[inline]
    pub fn touch_jump(
        &self,
        line: LineNumber,
        branch: BranchId,
        outcome: bool,
        hits: u64,
    ) -> CoverdataResult<()> {
        match self
            .lines
            .with(&line, |data| data.touch_jump(branch, outcome, hits))
        {
            Some(true) => Ok(()),
            Some(false) => Err(self.unregistered_jump(line, branch)),
            None => Err(self.unregistered_line(line)),
        }
    }

    /// Record `hits` selections of `case` on a switch
    ///
    /// Negative or out-of-range cases are counted on the default case.
    #[inline]
    pub fn touch_switch(
        &self,
        line: LineNumber,
        switch: BranchId,
        case: i32,
        hits: u64,
    ) -> CoverdataResult<()> {
        match self
            .lines
            .with(&line, |data| data.touch_switch(switch, case, hits))
        {
            Some(true) => Ok(()),
            Some(false) => Err(self.unregistered_switch(line, switch)),
            None => Err(self.unregistered_line(line)),
        }
    }

    #[cold]
    fn unregistered_line(&self, line: LineNumber) -> CoverdataError {
        error!(class = %self.name, %line, "no instrument data for line");
        CoverdataError::UnregisteredLine {
            class: self.name.clone(),
            line,
        }
    }

    #[cold]
    fn unregistered_jump(&self, line: LineNumber, branch: BranchId) -> CoverdataError {
        error!(class = %self.name, %line, %branch, "no instrument data for jump");
        CoverdataError::UnregisteredJump {
            class: self.name.clone(),
            line,
            branch,
        }
    }

    #[cold]
    fn unregistered_switch(&self, line: LineNumber, switch: BranchId) -> CoverdataError {
        error!(class = %self.name, %line, %switch, "no instrument data for switch");
        CoverdataError::UnregisteredSwitch {
            class: self.name.clone(),
            line,
            switch,
        }
    }

    #[cold]
    fn oversized_switch(&self, line: LineNumber, switch: BranchId, cases: u64) -> CoverdataError {
        error!(class = %self.name, %line, %switch, cases, "switch has too many cases");
        CoverdataError::SwitchTooLarge {
            class: self.name.clone(),
            line,
            switch,
            cases,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Shared handle to a registered line
    #[must_use]
    pub fn line(&self, line: LineNumber) -> Option<Arc<LineData>> {
        self.lines.get(&line)
    }

    /// Per-line summaries ordered by line number
    #[must_use]
    pub fn lines(&self) -> Vec<LineSummary> {
        self.lines
            .entries()
            .values()
            .map(|line| line.to_summary())
            .collect()
    }

    /// Registered line numbers in ascending order
    #[must_use]
    pub fn line_numbers(&self) -> Vec<LineNumber> {
        self.lines.keys()
    }

    /// Line numbers that carry jumps or switches, in ascending order
    #[must_use]
    pub fn branch_line_numbers(&self) -> Vec<LineNumber> {
        self.branches.keys()
    }

    /// Whether `line` has been registered
    #[must_use]
    pub fn has_line(&self, line: LineNumber) -> bool {
        self.lines.contains_key(&line)
    }

    /// Independent copy of the current counts, with its own branch index
    pub(crate) fn snapshot(&self) -> Self {
        let lines: BTreeMap<_, _> = self
            .lines
            .entries()
            .iter()
            .map(|(number, line)| (*number, Arc::new(line.snapshot())))
            .collect();
        let branches = self
            .branches
            .keys()
            .into_iter()
            .filter_map(|number| lines.get(&number).map(|line| (number, Arc::clone(line))))
            .collect();

        Self {
            name: self.name.clone(),
            separator: self.separator,
            lines: Registry::from_entries(lines),
            branches: Registry::from_entries(branches),
        }
    }

    /// Merge that reports a name mismatch instead of ignoring it
    pub fn try_merge(&self, other: &Self) -> CoverdataResult<()> {
        if self.name != other.name {
            return Err(CoverdataError::ClassMismatch {
                expected: self.name.clone(),
                found: other.name.clone(),
            });
        }
        self.merge(other);
        Ok(())
    }
}

impl CoverageData for ClassData {
    /// Fold a snapshot of the same class into this one
    ///
    /// A snapshot of a differently named class is ignored without error; use
    /// [`ClassData::try_merge`] to have that reported. Lines only present in
    /// `other` are copied in with their current counts; `other` keeps its
    /// own records and later touches on it never reach `self`.
    fn merge(&self, other: &Self) {
        if self.name != other.name {
            warn!(
                class = %self.name,
                other = %other.name,
                "skipping coverage merge across classes"
            );
            return;
        }

        let other_branch_lines = other.branches.keys();
        let adopted = self.lines.absorb(&other.lines, LineData::snapshot);

        // Index our own record for the line, never the donor's.
        let lines = self.lines.entries();
        let unindexed: Vec<_> = other_branch_lines
            .into_iter()
            .filter(|number| !self.branches.contains_key(number))
            .filter_map(|number| lines.get(&number).map(|line| (number, Arc::clone(line))))
            .collect();
        if !unindexed.is_empty() {
            self.branches.update(|branches| {
                for (number, line) in unindexed {
                    branches.entry(number).or_insert(line);
                }
            });
        }

        debug!(class = %self.name, adopted, "merged class coverage");
    }

    fn valid_branches(&self) -> u64 {
        self.branches
            .entries()
            .values()
            .map(|line| line.valid_branches())
            .sum()
    }

    fn covered_branches(&self) -> u64 {
        self.branches
            .entries()
            .values()
            .map(|line| line.covered_branches())
            .sum()
    }

    fn valid_lines(&self) -> u64 {
        self.lines.len() as u64
    }

    fn covered_lines(&self) -> u64 {
        self.lines
            .entries()
            .values()
            .filter(|line| line.hits() > 0)
            .count() as u64
    }
}

impl PartialEq for ClassData {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.name == other.name
            && *self.lines.entries() == *other.lines.entries()
            && self.branch_line_numbers() == other.branch_line_numbers()
    }
}

impl Eq for ClassData {}

impl Hash for ClassData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
