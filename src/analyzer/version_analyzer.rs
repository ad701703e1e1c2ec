use crate::config::VersioningConfig;
use crate::domain::{Version, VersionBump};
use crate::error::Result;
use crate::git::HistoryEntry;

/// Analyzes commits to determine version bump type
#[derive(Debug, Clone)]
pub struct VersionAnalyzer {
    config: VersioningConfig,
}

impl VersionAnalyzer {
    /// Create a new version analyzer
    pub fn new(config: VersioningConfig) -> Self {
        VersionAnalyzer { config }
    }

    /// Classify a single history entry
    pub fn classify(&self, entry: &HistoryEntry) -> VersionBump {
        let message = &entry.message;
        if message.is_breaking_change {
            return VersionBump::Major;
        }

        let commit_type = message.r#type.as_str();
        let listed = |types: &[String]| types.iter().any(|t| t.eq_ignore_ascii_case(commit_type));

        if listed(&self.config.update_major) {
            VersionBump::Major
        } else if listed(&self.config.update_minor) {
            VersionBump::Minor
        } else if listed(&self.config.update_patch) {
            VersionBump::Patch
        } else if self.config.ignore_unknown {
            VersionBump::None
        } else {
            VersionBump::Patch
        }
    }

    /// Highest-severity bump across all entries; order does not matter
    pub fn analyze(&self, entries: &[HistoryEntry]) -> VersionBump {
        entries
            .iter()
            .map(|entry| self.classify(entry))
            .max()
            .unwrap_or(VersionBump::None)
    }

    /// Next version from `base` given the commits since it.
    ///
    /// Returns `(base, false)` when no entry classifies above `None`.
    pub fn next_version(
        &self,
        base: &Version,
        entries: &[HistoryEntry],
    ) -> Result<(Version, bool)> {
        match self.analyze(entries) {
            VersionBump::None => Ok((base.clone(), false)),
            bump => Ok((base.bump(bump)?, true)),
        }
    }
}
