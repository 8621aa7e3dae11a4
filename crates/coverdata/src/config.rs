//! Coverage Data Configuration
//!
//! `probar.toml`-style settings for the coverage data model. Supports
//! JSON/YAML deserialization via serde; missing keys fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::class::DEFAULT_PACKAGE_SEPARATOR;
use crate::data::CoverageSummary;
use crate::result::{CoverdataError, CoverdataResult};

/// Root configuration for coverage data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverdataConfig {
    /// Separator between package and class in fully-qualified names
    pub package_separator: char,
    /// Minimum coverage thresholds
    pub thresholds: ThresholdConfig,
}

impl Default for CoverdataConfig {
    fn default() -> Self {
        Self {
            package_separator: DEFAULT_PACKAGE_SEPARATOR,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl CoverdataConfig {
    /// Create a builder for coverage data config
    #[must_use]
    pub fn builder() -> CoverdataConfigBuilder {
        CoverdataConfigBuilder::default()
    }

    /// Parse configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> CoverdataResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| CoverdataError::Config {
            message: e.to_string(),
        })
    }

    /// Parse configuration from JSON
    pub fn from_json_str(json: &str) -> CoverdataResult<Self> {
        serde_json::from_str(json).map_err(|e| CoverdataError::Config {
            message: e.to_string(),
        })
    }
}

/// Builder for coverage data configuration
#[derive(Debug, Default)]
pub struct CoverdataConfigBuilder {
    config: CoverdataConfig,
}

impl CoverdataConfigBuilder {
    /// Set the package separator
    #[must_use]
    pub fn package_separator(mut self, separator: char) -> Self {
        self.config.package_separator = separator;
        self
    }

    /// Set the minimum line rate (0.0 - 1.0)
    #[must_use]
    pub fn min_line_rate(mut self, rate: f64) -> Self {
        self.config.thresholds.min_line_rate = rate;
        self
    }

    /// Set the minimum branch rate (0.0 - 1.0)
    #[must_use]
    pub fn min_branch_rate(mut self, rate: f64) -> Self {
        self.config.thresholds.min_branch_rate = rate;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> CoverdataConfig {
        self.config
    }
}

/// Threshold configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum line coverage rate (0.0 - 1.0)
    pub min_line_rate: f64,
    /// Minimum branch coverage rate (0.0 - 1.0)
    pub min_branch_rate: f64,
}

impl ThresholdConfig {
    /// Every threshold `summary` falls short of
    #[must_use]
    pub fn check(&self, summary: &CoverageSummary) -> Vec<ThresholdViolation> {
        let mut violations = Vec::new();
        if summary.line_rate < self.min_line_rate {
            violations.push(ThresholdViolation::LineRate {
                expected: self.min_line_rate,
                actual: summary.line_rate,
            });
        }
        if summary.branch_rate < self.min_branch_rate {
            violations.push(ThresholdViolation::BranchRate {
                expected: self.min_branch_rate,
                actual: summary.branch_rate,
            });
        }
        violations
    }
}

/// A coverage rate below its configured minimum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdViolation {
    /// Line rate below `min_line_rate`
    LineRate {
        /// Configured minimum
        expected: f64,
        /// Observed rate
        actual: f64,
    },
    /// Branch rate below `min_branch_rate`
    BranchRate {
        /// Configured minimum
        expected: f64,
        /// Observed rate
        actual: f64,
    },
}

impl ThresholdViolation {
    /// Get a human-readable description
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::LineRate { expected, actual } => format!(
                "Line coverage {:.1}% below minimum {:.1}%",
                actual * 100.0,
                expected * 100.0
            ),
            Self::BranchRate { expected, actual } => format!(
                "Branch coverage {:.1}% below minimum {:.1}%",
                actual * 100.0,
                expected * 100.0
            ),
        }
    }
}
