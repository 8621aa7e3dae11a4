//! Type-Safe Line and Branch Identifiers
//!
//! Line numbers and branch ids are both small integers handed out by the
//! instrumentation step. Wrapping them keeps one from being passed where the
//! other is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source line number within a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineNumber(u32);

impl LineNumber {
    /// Create a new line number
    #[inline]
    #[must_use]
    pub const fn new(line: u32) -> Self {
        Self(line)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for LineNumber {
    fn from(line: u32) -> Self {
        Self(line)
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local id of a jump or switch on one line
///
/// Jumps and switches are numbered independently, so the same value may name
/// both a jump and a switch on the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(u32);

impl BranchId {
    /// Create a new branch id
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for BranchId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
