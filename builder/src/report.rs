//! Per-artefact outcomes collected during a build.

use camino::{Utf8Path, Utf8PathBuf};

/// What happened to one candidate source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtefactOutcome {
    /// Packaged, indexed, signed, and described by a download manifest.
    Published,
    /// Already present in the versions index; nothing was written.
    Skipped,
    /// Processing stopped at the failing step.
    Failed {
        /// Rendered error message.
        reason: String,
    },
}

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactRecord {
    /// Source file the outcome belongs to.
    pub source: Utf8PathBuf,
    /// The outcome.
    pub outcome: ArtefactOutcome,
}

/// Outcomes of a whole build, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    records: Vec<ArtefactRecord>,
}

impl BuildReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome for `source`.
    pub fn record(&mut self, source: impl Into<Utf8PathBuf>, outcome: ArtefactOutcome) {
        self.records.push(ArtefactRecord {
            source: source.into(),
            outcome,
        });
    }

    /// Append every record of `other`.
    pub fn extend(&mut self, other: Self) {
        self.records.extend(other.records);
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[ArtefactRecord] {
        &self.records
    }

    /// Outcome recorded for `source`, if any.
    #[must_use]
    pub fn outcome_for(&self, source: &Utf8Path) -> Option<&ArtefactOutcome> {
        self.records
            .iter()
            .find(|r| r.source.as_path() == source)
            .map(|r| &r.outcome)
    }

    /// Number of published artefacts.
    #[must_use]
    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, ArtefactOutcome::Published))
    }

    /// Number of skipped artefacts.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ArtefactOutcome::Skipped))
    }

    /// Records whose processing failed.
    #[must_use]
    pub fn failures(&self) -> Vec<&ArtefactRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, ArtefactOutcome::Failed { .. }))
            .collect()
    }

    /// Returns true if any artefact failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.outcome, ArtefactOutcome::Failed { .. }))
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} published, {} skipped, {} failed",
            self.published(),
            self.skipped(),
            self.failures().len()
        )
    }

    fn count(&self, predicate: impl Fn(&ArtefactOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(&r.outcome)).count()
    }
}
