//! Command workflow orchestration
//!
//! Each workflow discovers components and processes them one at a time,
//! stopping at the first failure. Results come back as [`ComponentReport`]s
//! so the binary decides how to render them and tests can inspect them
//! without capturing output.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::changelog::{render as render_changelog, ReleaseNote, CHANGELOG_FILE_NAME};
use crate::domain::{Component, ComponentTagPattern, Version, VersionBump};
use crate::git::{GitTag, LogRange, Repository};
use crate::monorepo::{MonorepoProcessor, Resolution};

/// Arguments for the tag workflow
///
/// Mirrors the CLI flags merged with the `[tag]` configuration section.
#[derive(Debug, Clone, PartialEq)]
pub struct TagWorkflowArgs {
    /// Push created tags to `remote`
    pub push: bool,
    pub remote: String,
    /// Preview mode - don't write versions or create tags
    pub dry_run: bool,
}

/// Arguments for the changelog workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogWorkflowArgs {
    /// Number of most recent tags to include
    pub size: usize,
    /// Include every tag regardless of `size`
    pub all: bool,
    /// Add a section for the unreleased next version
    pub add_next_version: bool,
    /// Skip tags whose version part is not a semantic version
    pub semantic_version_only: bool,
}

impl Default for ChangelogWorkflowArgs {
    fn default() -> Self {
        ChangelogWorkflowArgs {
            size: 10,
            all: false,
            add_next_version: false,
            semantic_version_only: false,
        }
    }
}

/// What happened to one component
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Listed only
    Discovered,
    /// No bump warranted, or already at the bumped version
    Unchanged,
    /// Bump computed but not written (next-version or dry run)
    Pending,
    /// New version written to the versioning document
    Written { file: PathBuf },
    /// Tag created, and pushed when requested
    Tagged { tag: String, pushed: bool },
    /// Tag would be created (dry run)
    WouldTag { tag: String },
    /// Tag for the version already present
    TagExists { tag: String },
    /// Component-scoped tags, oldest first
    Tags(Vec<GitTag>),
    /// Changelog written with this many releases
    ChangelogWritten { file: PathBuf, releases: usize },
    /// No tags and no unreleased version to describe
    NoChangelogEntries,
}

/// Result of running a workflow against one component
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReport {
    pub name: String,
    /// Component root relative to the repository root
    pub relative_path: String,
    pub current: Version,
    /// Computed next version, when the workflow resolves one
    pub next: Option<Version>,
    pub outcome: Outcome,
    pub warnings: Vec<BoundaryWarning>,
}

impl ComponentReport {
    fn new<R: Repository>(processor: &MonorepoProcessor<'_, R>, component: &Component) -> Self {
        ComponentReport {
            name: component.name.clone(),
            relative_path: processor.relative_dir(component),
            current: component.current_version.clone(),
            next: None,
            outcome: Outcome::Discovered,
            warnings: Vec::new(),
        }
    }

    fn resolved(mut self, resolution: &Resolution) -> Self {
        self.next = Some(resolution.next.clone());
        self.warnings.extend_from_slice(resolution.warnings());
        self
    }
}

fn discover<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
) -> Result<Vec<Component>> {
    processor
        .find_components(pattern)
        .context("error finding monorepo components")
}

fn resolve<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    component: &Component,
) -> Result<Resolution> {
    processor
        .resolve(component)
        .with_context(|| format!("error getting commits for {}", component.name))
}

/// List discovered components with their current versions
pub fn list_components<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
) -> Result<Vec<ComponentReport>> {
    Ok(discover(processor, pattern)?
        .iter()
        .map(|component| ComponentReport::new(processor, component))
        .collect())
}

/// Compute each component's next version without writing anything
pub fn next_version<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
) -> Result<Vec<ComponentReport>> {
    let mut reports = Vec::new();
    for component in discover(processor, pattern)? {
        let resolution = resolve(processor, &component)?;
        let mut report = ComponentReport::new(processor, &component).resolved(&resolution);
        report.outcome = if resolution.changed {
            Outcome::Pending
        } else {
            Outcome::Unchanged
        };
        reports.push(report);
    }
    Ok(reports)
}

/// Write bumped versions into each component's versioning document.
///
/// Components already at their computed version are left untouched.
pub fn update_version<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
    dry_run: bool,
) -> Result<Vec<ComponentReport>> {
    let mut reports = Vec::new();
    for component in discover(processor, pattern)? {
        let (report, _) = update_one(processor, &component, dry_run)?;
        reports.push(report);
    }
    Ok(reports)
}

fn update_one<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    component: &Component,
    dry_run: bool,
) -> Result<(ComponentReport, Version)> {
    let resolution = resolve(processor, component)?;
    let mut report = ComponentReport::new(processor, component).resolved(&resolution);

    report.outcome = if !resolution.changed {
        Outcome::Unchanged
    } else if dry_run {
        Outcome::Pending
    } else {
        processor
            .update_version(component, &resolution.next)
            .with_context(|| format!("error updating version for {}", component.name))?;
        Outcome::Written {
            file: component.versioning_file_path.clone(),
        }
    };

    Ok((report, resolution.next))
}

/// Update versions like [`update_version`], then tag each component's
/// resulting version as `<rel>/v<version>` unless that tag already exists.
pub fn tag<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
    args: &TagWorkflowArgs,
) -> Result<Vec<ComponentReport>> {
    let existing: Vec<String> = processor
        .repo()
        .tags()
        .context("error listing tags")?
        .into_iter()
        .map(|t| t.name)
        .collect();

    let mut reports = Vec::new();
    for component in discover(processor, pattern)? {
        let (mut report, version) = update_one(processor, &component, args.dry_run)?;
        let tag_name = component
            .tag_pattern(processor.repo_root())
            .format(&version);

        report.outcome = if existing.contains(&tag_name) {
            report.warnings.push(BoundaryWarning::TagAlreadyExists {
                tag: tag_name.clone(),
            });
            Outcome::TagExists { tag: tag_name }
        } else if args.dry_run {
            Outcome::WouldTag { tag: tag_name }
        } else {
            let remote = args.push.then_some(args.remote.as_str());
            let tag = processor
                .repo()
                .tag_for_component(&version, &report.relative_path, remote)
                .with_context(|| format!("error creating tag for {}", component.name))?;
            info!(component = %component.name, tag = %tag, pushed = args.push, "created tag");
            Outcome::Tagged {
                tag,
                pushed: args.push,
            }
        };
        reports.push(report);
    }
    Ok(reports)
}

/// List each component's scoped tags, oldest first
pub fn component_tags<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
) -> Result<Vec<ComponentReport>> {
    let all_tags = processor.repo().tags().context("error listing tags")?;

    let mut reports = Vec::new();
    for component in discover(processor, pattern)? {
        let mut report = ComponentReport::new(processor, &component);
        let tag_pattern = component.tag_pattern(processor.repo_root());
        report.warnings.extend(
            all_tags
                .iter()
                .filter(|t| tag_pattern.owns(&t.name) && !tag_pattern.matches(&t.name))
                .map(|t| BoundaryWarning::UnparsableTag { tag: t.name.clone() }),
        );
        let tags = processor
            .repo()
            .component_tags(&report.relative_path)
            .with_context(|| format!("error getting tags for {}", component.name))?;
        report.outcome = Outcome::Tags(tags);
        reports.push(report);
    }
    Ok(reports)
}

/// Tags in `pattern`'s namespace, newest first, with their versions when
/// they parse
fn release_tags(
    all_tags: &[GitTag],
    pattern: &ComponentTagPattern,
) -> Vec<(GitTag, Option<Version>)> {
    let mut tags: Vec<(GitTag, Option<Version>)> = all_tags
        .iter()
        .filter(|t| pattern.owns(&t.name))
        .map(|t| (t.clone(), pattern.parse(&t.name)))
        .collect();
    tags.sort_by(|(a, av), (b, bv)| b.date.cmp(&a.date).then_with(|| bv.cmp(av)));
    tags
}

/// Write `CHANGELOG.md` into each component's directory.
///
/// Every tag contributes one release made of the commits since the next
/// older tag that touch the component. Components with nothing to describe
/// are skipped.
pub fn changelog<R: Repository>(
    processor: &MonorepoProcessor<'_, R>,
    pattern: &str,
    args: &ChangelogWorkflowArgs,
) -> Result<Vec<ComponentReport>> {
    let all_tags = processor.repo().tags().context("error listing tags")?;

    let mut reports = Vec::new();
    for component in discover(processor, pattern)? {
        let mut report = ComponentReport::new(processor, &component);
        let mut notes = Vec::new();

        if args.add_next_version {
            let resolution = resolve(processor, &component)?;
            report = report.resolved(&resolution);
            if resolution.bump != VersionBump::None {
                let commits = &resolution.baseline.commits;
                let date = commits
                    .first()
                    .map(|c| c.date.date_naive())
                    .unwrap_or_else(|| Utc::now().date_naive());
                notes.push(ReleaseNote::new(
                    format!("v{}", resolution.next),
                    None,
                    date,
                    commits,
                ));
            }
        }

        let tags = release_tags(&all_tags, &component.tag_pattern(processor.repo_root()));
        for (i, (tag, version)) in tags.iter().enumerate() {
            if !args.all && i >= args.size {
                break;
            }
            if args.semantic_version_only && version.is_none() {
                report.warnings.push(BoundaryWarning::UnparsableTag {
                    tag: tag.name.clone(),
                });
                continue;
            }

            let previous = tags.get(i + 1).map(|(t, _)| t.name.clone());
            let range =
                LogRange::path_between(previous, Some(tag.name.clone()), &report.relative_path);
            let commits = processor
                .repo()
                .log(&range)
                .with_context(|| format!("error getting commits for tag {}", tag.name))?;

            let title = match version {
                Some(version) => format!("v{}", version),
                None => tag.name.clone(),
            };
            notes.push(ReleaseNote::new(
                title,
                Some(tag.name.clone()),
                tag.date.date_naive(),
                &commits,
            ));
        }

        report.outcome = if notes.is_empty() {
            Outcome::NoChangelogEntries
        } else {
            let file = component.root_path.join(CHANGELOG_FILE_NAME);
            fs::write(&file, render_changelog(&notes))
                .with_context(|| format!("could not write changelog for {}", component.name))?;
            info!(component = %component.name, file = %file.display(), "wrote changelog");
            Outcome::ChangelogWritten {
                file,
                releases: notes.len(),
            }
        };
        reports.push(report);
    }
    Ok(reports)
}
