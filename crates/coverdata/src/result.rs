//! Result and error types for coverage data.

use thiserror::Error;

use crate::ids::{BranchId, LineNumber};

/// Result type for coverage data operations
pub type CoverdataResult<T> = Result<T, CoverdataError>;

/// Errors that can occur while registering, touching or merging coverage data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverdataError {
    /// A line was touched or given a branch before it was registered
    #[error("No instrument data for class {class} line {line}")]
    UnregisteredLine {
        /// Fully-qualified class name
        class: String,
        /// Line that was never registered
        line: LineNumber,
    },

    /// A jump was touched before it was registered on its line
    #[error("No instrument data for class {class} line {line} jump {branch}")]
    UnregisteredJump {
        /// Fully-qualified class name
        class: String,
        /// Line owning the jump
        line: LineNumber,
        /// Jump that was never registered
        branch: BranchId,
    },

    /// A switch was touched before it was registered on its line
    #[error("No instrument data for class {class} line {line} switch {switch}")]
    UnregisteredSwitch {
        /// Fully-qualified class name
        class: String,
        /// Line owning the switch
        line: LineNumber,
        /// Switch that was never registered
        switch: BranchId,
    },

    /// A switch range was registered with `max < min`
    #[error("Invalid switch range {min}..={max} for class {class} line {line}")]
    InvalidSwitchRange {
        /// Fully-qualified class name
        class: String,
        /// Line owning the switch
        line: LineNumber,
        /// Lowest case key
        min: i32,
        /// Highest case key
        max: i32,
    },

    /// A switch was registered with more cases than a switch may hold
    #[error("Too many cases ({cases}) for class {class} line {line} switch {switch}")]
    SwitchTooLarge {
        /// Fully-qualified class name
        class: String,
        /// Line owning the switch
        line: LineNumber,
        /// Switch being registered
        switch: BranchId,
        /// Requested number of case keys
        cases: u64,
    },

    /// Strict merge of two classes with different names
    #[error("Cannot merge coverage for class {found} into class {expected}")]
    ClassMismatch {
        /// Name of the receiving class
        expected: String,
        /// Name of the donor class
        found: String,
    },

    /// Configuration text could not be parsed
    #[error("Invalid coverage configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

impl CoverdataError {
    /// Whether this error means instrumentation and runtime model are out of sync
    ///
    /// These are fatal to the calling operation and must never be swallowed.
    #[must_use]
    pub const fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredLine { .. }
                | Self::UnregisteredJump { .. }
                | Self::UnregisteredSwitch { .. }
                | Self::InvalidSwitchRange { .. }
                | Self::SwitchTooLarge { .. }
        )
    }
}
