//! Per-component versioning for repositories holding several independently
//! released subtrees.
//!
//! - `discovery` - Locate components and read their current versions
//! - `baseline` - Anchor each component's bump in repository history
//! - `writer` - Persist a new version into the versioning document

pub mod baseline;
pub mod discovery;
pub mod writer;

pub use baseline::{
    Baseline, BaselineContext, BaselineResolver, BaselineSource, BaselineStrategy,
    ComponentTagStrategy, FileHistoryStrategy, UnboundedStrategy,
};
pub use discovery::{find_components, read_version, read_version_from_bytes};
pub use writer::write_version;

use std::path::{Path, PathBuf};

use crate::analyzer::VersionAnalyzer;
use crate::boundary::BoundaryWarning;
use crate::document::DocumentPath;
use crate::domain::{Component, Version, VersionBump};
use crate::error::Result;
use crate::git::Repository;

/// Outcome of resolving a component's next version
#[derive(Debug, Clone)]
pub struct Resolution {
    pub baseline: Baseline,
    /// Highest bump across the baseline's commits
    pub bump: VersionBump,
    /// Version the component should carry; the current one when unchanged
    pub next: Version,
    /// Whether `next` differs from the on-disk version
    pub changed: bool,
}

impl Resolution {
    pub fn warnings(&self) -> &[BoundaryWarning] {
        &self.baseline.warnings
    }
}

/// Ties discovery, baseline resolution, bump analysis and writing together
/// for one repository.
pub struct MonorepoProcessor<'r, R: Repository> {
    repo: &'r R,
    repo_root: PathBuf,
    version_path: DocumentPath,
    analyzer: VersionAnalyzer,
    resolver: BaselineResolver,
}

impl<'r, R: Repository> MonorepoProcessor<'r, R> {
    pub fn new(
        repo: &'r R,
        repo_root: impl Into<PathBuf>,
        version_path: DocumentPath,
        analyzer: VersionAnalyzer,
    ) -> Self {
        MonorepoProcessor {
            repo,
            repo_root: repo_root.into(),
            version_path,
            analyzer,
            resolver: BaselineResolver::default(),
        }
    }

    /// Replace the default three-tier resolver
    pub fn with_resolver(mut self, resolver: BaselineResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn repo(&self) -> &R {
        self.repo
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn version_path(&self) -> &DocumentPath {
        &self.version_path
    }

    pub fn find_components(&self, pattern: &str) -> Result<Vec<Component>> {
        find_components(&self.repo_root, pattern, &self.version_path)
    }

    /// Compute the next version for `component`.
    ///
    /// `changed` is false when no commit warrants a bump or when the bumped
    /// version equals what is already on disk. Re-running after a write (with
    /// no new commits) therefore reports no change.
    pub fn resolve(&self, component: &Component) -> Result<Resolution> {
        let ctx = BaselineContext {
            repo: self.repo,
            repo_root: &self.repo_root,
            version_path: &self.version_path,
        };
        let mut baseline = self.resolver.resolve(&ctx, component)?;

        if baseline.commits.is_empty() {
            baseline.warnings.push(BoundaryWarning::NoNewCommits {
                component: component.name.clone(),
                baseline: baseline.source.to_string(),
            });
        }

        let bump = self.analyzer.analyze(&baseline.commits);
        let (next, changed) = next_for(component, &baseline.version, bump)?;
        Ok(Resolution {
            baseline,
            bump,
            next,
            changed,
        })
    }

    /// Write `version` into the component's document
    pub fn update_version(&self, component: &Component, version: &Version) -> Result<()> {
        write_version(component, version, &self.version_path)
    }

    /// Component path relative to the repository root, as used in tags and
    /// path filters
    pub fn relative_dir(&self, component: &Component) -> String {
        component.relative_dir(&self.repo_root)
    }
}

fn next_for(
    component: &Component,
    base: &Version,
    bump: VersionBump,
) -> Result<(Version, bool)> {
    let current = &component.current_version;
    if bump == VersionBump::None {
        return Ok((current.clone(), false));
    }

    let next = base.bump(bump)?.with_prefix_of(current);
    if &next == current {
        Ok((current.clone(), false))
    } else {
        Ok((next, true))
    }
}
