//! Baseline resolution: which version a component's next bump starts from and
//! which commits count towards it.
//!
//! Strategies are tried in order and the first one that applies wins:
//!
//! 1. [`ComponentTagStrategy`]: the newest `<rel>/v<semver>` tag.
//! 2. [`FileHistoryStrategy`]: the commit that last changed the versioning
//!    document, with the version read from that committed snapshot.
//! 3. [`UnboundedStrategy`]: every commit touching the component, based on the
//!    on-disk version.
//!
//! Anchoring the base on committed state is what keeps resolution idempotent:
//! after a bump is written and committed, the base is the bumped version and no
//! commits follow it.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::boundary::BoundaryWarning;
use crate::document::DocumentPath;
use crate::domain::{Component, Version};
use crate::error::{MonobumpError, Result};
use crate::git::{HistoryEntry, LogRange, Repository};
use crate::monorepo::discovery::read_version_from_bytes;

/// Where a baseline came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineSource {
    /// Newest component tag
    ComponentTag(String),
    /// Commit that last modified the versioning document
    FileHistory(String),
    /// No anchor in history
    Unbounded,
}

impl fmt::Display for BaselineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaselineSource::ComponentTag(tag) => write!(f, "tag {}", tag),
            BaselineSource::FileHistory(hash) => {
                write!(f, "commit {}", crate::boundary::short_hash(hash))
            }
            BaselineSource::Unbounded => f.write_str("first commit"),
        }
    }
}

/// Starting version and the commits made since it
#[derive(Debug, Clone)]
pub struct Baseline {
    pub version: Version,
    /// Commits touching the component after the anchor, most recent first
    pub commits: Vec<HistoryEntry>,
    pub source: BaselineSource,
    pub warnings: Vec<BoundaryWarning>,
}

/// Everything a strategy needs besides the component itself
pub struct BaselineContext<'a> {
    pub repo: &'a dyn Repository,
    pub repo_root: &'a Path,
    pub version_path: &'a DocumentPath,
}

/// One way of anchoring a component's baseline in history
pub trait BaselineStrategy {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the strategy does not apply to this component
    fn resolve(&self, ctx: &BaselineContext<'_>, component: &Component)
        -> Result<Option<Baseline>>;
}

/// Anchor on the newest component-scoped tag
pub struct ComponentTagStrategy;

impl BaselineStrategy for ComponentTagStrategy {
    fn name(&self) -> &'static str {
        "component-tag"
    }

    fn resolve(
        &self,
        ctx: &BaselineContext<'_>,
        component: &Component,
    ) -> Result<Option<Baseline>> {
        let rel_dir = component.relative_dir(ctx.repo_root);
        let Some(tag) = ctx.repo.last_component_tag(&rel_dir)? else {
            return Ok(None);
        };

        // last_component_tag only yields tags whose suffix parses
        let Some(version) = component.tag_pattern(ctx.repo_root).parse(&tag) else {
            return Ok(None);
        };

        let commits = ctx.repo.log(&LogRange::path(Some(tag.clone()), &rel_dir))?;
        Ok(Some(Baseline {
            version,
            commits,
            source: BaselineSource::ComponentTag(tag),
            warnings: Vec::new(),
        }))
    }
}

/// Anchor on the commit that last modified the versioning document
pub struct FileHistoryStrategy;

impl BaselineStrategy for FileHistoryStrategy {
    fn name(&self) -> &'static str {
        "file-history"
    }

    fn resolve(
        &self,
        ctx: &BaselineContext<'_>,
        component: &Component,
    ) -> Result<Option<Baseline>> {
        let rel_file = component.relative_file(ctx.repo_root);
        let Some(hash) = ctx.repo.last_file_commit(&rel_file)? else {
            return Ok(None);
        };

        let rel_dir = component.relative_dir(ctx.repo_root);
        let commits = ctx.repo.log(&LogRange::path(Some(hash.clone()), &rel_dir))?;

        let historical = ctx.repo.show_file(&hash, &rel_file).and_then(|content| {
            read_version_from_bytes(&component.versioning_file_path, &content, ctx.version_path)
        });

        let mut warnings = Vec::new();
        let version = match historical {
            Ok(version) => version,
            Err(err) => {
                warn!(component = %component.name, commit = %hash, error = %err,
                    "cannot read committed version, using on-disk version");
                warnings.push(BoundaryWarning::HistoricalVersionUnreadable {
                    component: component.name.clone(),
                    commit: hash.clone(),
                    reason: err.to_string(),
                });
                component.current_version.clone()
            }
        };

        Ok(Some(Baseline {
            version,
            commits,
            source: BaselineSource::FileHistory(hash),
            warnings,
        }))
    }
}

/// Every commit touching the component, based on the on-disk version
pub struct UnboundedStrategy;

impl BaselineStrategy for UnboundedStrategy {
    fn name(&self) -> &'static str {
        "unbounded"
    }

    fn resolve(
        &self,
        ctx: &BaselineContext<'_>,
        component: &Component,
    ) -> Result<Option<Baseline>> {
        let rel_dir = component.relative_dir(ctx.repo_root);
        let commits = ctx.repo.log(&LogRange::path(None, &rel_dir))?;
        Ok(Some(Baseline {
            version: component.current_version.clone(),
            commits,
            source: BaselineSource::Unbounded,
            warnings: Vec::new(),
        }))
    }
}

/// Ordered list of baseline strategies
pub struct BaselineResolver {
    strategies: Vec<Box<dyn BaselineStrategy>>,
}

impl Default for BaselineResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ComponentTagStrategy),
            Box::new(FileHistoryStrategy),
            Box::new(UnboundedStrategy),
        ])
    }
}

impl BaselineResolver {
    pub fn new(strategies: Vec<Box<dyn BaselineStrategy>>) -> Self {
        BaselineResolver { strategies }
    }

    /// Names of the strategies, in the order they are tried
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve with the first applicable strategy
    pub fn resolve(&self, ctx: &BaselineContext<'_>, component: &Component) -> Result<Baseline> {
        for strategy in &self.strategies {
            if let Some(baseline) = strategy.resolve(ctx, component)? {
                debug!(
                    component = %component.name,
                    strategy = strategy.name(),
                    base = %baseline.version,
                    commits = baseline.commits.len(),
                    "resolved baseline"
                );
                return Ok(baseline);
            }
        }

        Err(MonobumpError::history(format!(
            "no baseline strategy applies to '{}'",
            component.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use std::path::PathBuf;

    fn component(version: &str) -> Component {
        Component {
            name: "alpha".to_string(),
            root_path: PathBuf::from("/repo/alpha"),
            versioning_file_path: PathBuf::from("/repo/alpha/version.yml"),
            current_version: Version::parse_prefixed(version).unwrap(),
        }
    }

    fn resolve(repo: &MockRepository, component: &Component) -> Baseline {
        let version_path = DocumentPath::parse("version").unwrap();
        let ctx = BaselineContext {
            repo,
            repo_root: Path::new("/repo"),
            version_path: &version_path,
        };
        BaselineResolver::default().resolve(&ctx, component).unwrap()
    }

    #[test]
    fn test_default_order() {
        assert_eq!(
            BaselineResolver::default().names(),
            vec!["component-tag", "file-history", "unbounded"]
        );
    }

    #[test]
    fn test_tag_wins() {
        let repo = MockRepository::new();
        repo.add_commit("chore: init", &[("alpha/version.yml", "version: 1.0.0\n")]);
        let tagged = repo.add_commit("feat: first", &[("alpha/src", "a")]);
        repo.add_tag("alpha/v1.1.0", &tagged).unwrap();
        repo.add_commit("fix: later", &[("alpha/src", "b")]);
        repo.add_commit("fix: elsewhere", &[("beta/src", "b")]);

        let baseline = resolve(&repo, &component("1.1.0"));
        assert_eq!(baseline.source, BaselineSource::ComponentTag("alpha/v1.1.0".into()));
        assert_eq!(baseline.version, Version::new(1, 1, 0));
        assert_eq!(baseline.commits.len(), 1);
        assert_eq!(baseline.commits[0].subject(), "fix: later");
    }

    #[test]
    fn test_file_history_reads_committed_snapshot() {
        let repo = MockRepository::new();
        repo.add_commit("feat: old", &[("alpha/src", "a")]);
        let bump = repo.add_commit("chore: release", &[("alpha/version.yml", "version: 1.0.1\n")]);
        repo.add_commit("fix: after", &[("alpha/src", "b")]);

        // on-disk version differs from the committed one
        let baseline = resolve(&repo, &component("9.9.9"));
        assert_eq!(baseline.source, BaselineSource::FileHistory(bump));
        assert_eq!(baseline.version, Version::new(1, 0, 1));
        assert_eq!(baseline.commits.len(), 1);
        assert!(baseline.warnings.is_empty());
    }

    #[test]
    fn test_file_history_falls_back_to_disk_version() {
        let repo = MockRepository::new();
        let bump = repo.add_commit("chore: release", &[("alpha/version.yml", "name: x\n")]);
        repo.add_commit("fix: after", &[("alpha/src", "b")]);

        let baseline = resolve(&repo, &component("2.0.0"));
        assert_eq!(baseline.source, BaselineSource::FileHistory(bump));
        assert_eq!(baseline.version, Version::new(2, 0, 0));
        assert_eq!(baseline.commits.len(), 1);
        assert!(matches!(
            baseline.warnings.as_slice(),
            [BoundaryWarning::HistoricalVersionUnreadable { .. }]
        ));
    }

    #[test]
    fn test_unbounded_for_new_component() {
        let repo = MockRepository::new();
        repo.add_commit("feat: a", &[("alpha/src", "a")]);
        repo.add_commit("fix: b", &[("beta/src", "a")]);
        repo.add_commit("fix: c", &[("alpha/src", "c")]);

        let baseline = resolve(&repo, &component("0.1.0"));
        assert_eq!(baseline.source, BaselineSource::Unbounded);
        assert_eq!(baseline.version, Version::new(0, 1, 0));
        assert_eq!(baseline.commits.len(), 2);
    }

    #[test]
    fn test_empty_resolver_errors() {
        let repo = MockRepository::new();
        let version_path = DocumentPath::parse("version").unwrap();
        let ctx = BaselineContext {
            repo: &repo,
            repo_root: Path::new("/repo"),
            version_path: &version_path,
        };
        let result = BaselineResolver::new(Vec::new()).resolve(&ctx, &component("1.0.0"));
        assert!(matches!(result, Err(MonobumpError::HistoryLookupFailed(_))));
    }
}
