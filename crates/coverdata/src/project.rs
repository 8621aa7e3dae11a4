//! Coverage Session Container
//!
//! [`ProjectData`] holds every [`ClassData`] observed during one coverage
//! session, keyed by fully-qualified class name. It is an ordinary owned
//! value: each session (or each test process) creates its own, and finished
//! sessions are folded together with [`CoverageData::merge`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::class::ClassData;
use crate::config::{CoverdataConfig, ThresholdViolation};
use crate::data::{CoverageData, CoverageSummary};
use crate::registry::Registry;

/// Coverage for one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSummary {
    /// Package name, empty for the default package
    pub name: String,
    /// Number of classes in the package
    pub class_count: usize,
    /// Counts and rates over all classes in the package
    pub summary: CoverageSummary,
}

/// All class coverage recorded in one session
#[derive(Debug, Default)]
pub struct ProjectData {
    config: CoverdataConfig,
    classes: Registry<String, ClassData>,
}

impl ProjectData {
    /// Create an empty session
    #[must_use]
    pub fn new(config: CoverdataConfig) -> Self {
        Self {
            config,
            classes: Registry::default(),
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &CoverdataConfig {
        &self.config
    }

    /// Class with this name, created empty on first use
    pub fn class(&self, name: &str) -> Arc<ClassData> {
        if let Some(existing) = self.classes.get(name) {
            return existing;
        }

        let (class, _) = self.classes.get_or_insert_with(name.to_string(), || {
            debug!(class = name, "registered class");
            Arc::new(ClassData::with_separator(name, self.config.package_separator))
        });
        class
    }

    /// Class with this name, if any was recorded
    #[must_use]
    pub fn get_class(&self, name: &str) -> Option<Arc<ClassData>> {
        self.classes.get(name)
    }

    /// Number of recorded classes
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// All classes ordered by name
    #[must_use]
    pub fn classes(&self) -> Vec<Arc<ClassData>> {
        self.classes.entries().values().cloned().collect()
    }

    /// Per-package coverage ordered by package name
    #[must_use]
    pub fn packages(&self) -> Vec<PackageSummary> {
        let mut packages: BTreeMap<String, (usize, CoverageSummary)> = BTreeMap::new();
        for class in self.classes() {
            let entry = packages.entry(class.package_name().to_string()).or_default();
            entry.0 += 1;
            entry.1 = entry.1.combine(class.summary());
        }

        packages
            .into_iter()
            .map(|(name, (class_count, summary))| PackageSummary {
                name,
                class_count,
                summary,
            })
            .collect()
    }

    /// Fold one class snapshot into the class of the same name
    ///
    /// When no such class exists yet a copy of the snapshot is recorded.
    pub fn merge_class(&self, other: &ClassData) {
        let (class, adopted) = self
            .classes
            .get_or_insert_with(other.name().to_string(), || Arc::new(other.snapshot()));
        if adopted {
            debug!(class = other.name(), "adopted class coverage");
        } else {
            class.merge(other);
        }
    }

    /// Thresholds from the configuration that the session falls short of
    #[must_use]
    pub fn check_thresholds(&self) -> Vec<ThresholdViolation> {
        self.config.thresholds.check(&self.summary())
    }
}

impl CoverageData for ProjectData {
    fn merge(&self, other: &Self) {
        let merged = other.class_count();
        let adopted = self.classes.absorb(&other.classes, ClassData::snapshot);
        info!(
            classes = merged,
            adopted,
            total = self.class_count(),
            "merged coverage session"
        );
    }

    fn summary(&self) -> CoverageSummary {
        self.classes().iter().map(|class| class.summary()).sum()
    }

    fn valid_branches(&self) -> u64 {
        self.classes().iter().map(|c| c.valid_branches()).sum()
    }

    fn covered_branches(&self) -> u64 {
        self.classes().iter().map(|c| c.covered_branches()).sum()
    }

    fn valid_lines(&self) -> u64 {
        self.classes().iter().map(|c| c.valid_lines()).sum()
    }

    fn covered_lines(&self) -> u64 {
        self.classes().iter().map(|c| c.covered_lines()).sum()
    }
}
