//! Probar Coverdata: Concurrent Coverage Data Model
//!
//! The in-memory model behind Probar's line and branch coverage. Instrumented
//! code registers every line, jump and switch of a class once, then touches
//! their counters on every execution. Snapshots collected by independent
//! processes are merged into one aggregate without double counting.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  PROBAR COVERDATA                                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ProjectData ──► ClassData ──► LineData ──► JumpData             │
//! │                     │                  └──► SwitchData           │
//! │                     └── branch index (lines with branches)       │
//! │                                                                  │
//! │  register (once) → touch (hot path) → merge (after the run)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use probar_coverdata::{BranchId, ClassData, CoverageData, LineNumber};
//!
//! let class = ClassData::new("com.acme.Foo");
//! let line = class.add_line(LineNumber::new(10));
//! class.add_line_jump(LineNumber::new(10), BranchId::new(0)).unwrap();
//!
//! line.touch(1);
//! class.touch_jump(LineNumber::new(10), BranchId::new(0), true, 1).unwrap();
//!
//! assert_eq!(class.valid_branches(), 2);
//! assert_eq!(class.covered_branches(), 1);
//! ```

#![warn(missing_docs)]

mod class;
mod config;
mod data;
mod ids;
mod jump;
mod line;
mod lock;
mod project;
mod registry;
mod result;
mod switch;

pub use class::{ClassData, DEFAULT_PACKAGE_SEPARATOR};
pub use config::{CoverdataConfig, CoverdataConfigBuilder, ThresholdConfig, ThresholdViolation};
pub use data::{CoverageData, CoverageSummary};
pub use ids::{BranchId, LineNumber};
pub use jump::JumpData;
pub use line::{LineData, LineSummary, MethodInfo};
pub use project::{PackageSummary, ProjectData};
pub use result::{CoverdataError, CoverdataResult};
pub use switch::SwitchData;
