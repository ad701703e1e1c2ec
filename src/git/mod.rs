//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the repository history
//! the version engine needs, allowing for multiple implementations including
//! a real libgit2-backed repository and an in-memory fake for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! # Usage
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use monobump::git::{LogRange, Repository};
//! # fn example<R: Repository>(repo: &R) -> monobump::Result<()> {
//! if let Some(tag) = repo.last_component_tag("libs/foo")? {
//!     let commits = repo.log(&LogRange::path(Some(tag), "libs/foo"))?;
//!     println!("{} commits since last release", commits.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{CommitMessage, ComponentTagPattern, Version};
use crate::error::Result;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// A single commit as seen by the version engine
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Full commit hash
    pub hash: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    /// Complete commit message (subject and body)
    pub raw_message: String,
    /// Conventional-commit interpretation of `raw_message`
    pub message: CommitMessage,
}

impl HistoryEntry {
    pub fn new(
        hash: impl Into<String>,
        author: impl Into<String>,
        date: DateTime<FixedOffset>,
        raw_message: impl Into<String>,
    ) -> Self {
        let raw_message = raw_message.into();
        HistoryEntry {
            hash: hash.into(),
            author: author.into(),
            date,
            message: CommitMessage::parse(&raw_message),
            raw_message,
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.raw_message.lines().next().unwrap_or("")
    }
}

/// A tag and the date it was created
#[derive(Debug, Clone, PartialEq)]
pub struct GitTag {
    pub name: String,
    pub date: DateTime<FixedOffset>,
}

/// Which history entries to fetch.
///
/// `start` is exclusive and `None` means "from the first commit"; `end` is
/// inclusive and `None` means HEAD. Entries come back most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRange {
    /// Bounded by tag names
    Tag {
        start: Option<String>,
        end: Option<String>,
    },
    /// Bounded by commit dates, both ends inclusive
    Date {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Bounded by commit hashes
    Hash {
        start: Option<String>,
        end: Option<String>,
    },
    /// Bounded by revisions (hash or tag) and restricted to commits touching
    /// files under `paths`
    Path {
        start: Option<String>,
        end: Option<String>,
        paths: Vec<String>,
    },
}

impl LogRange {
    /// Commits after `start` up to HEAD that touch `subtree`.
    ///
    /// An empty `subtree` covers the whole repository.
    pub fn path(start: Option<String>, subtree: &str) -> Self {
        Self::path_between(start, None, subtree)
    }

    /// Commits after `start` up to and including `end` that touch `subtree`
    pub fn path_between(start: Option<String>, end: Option<String>, subtree: &str) -> Self {
        let paths = if subtree.is_empty() {
            Vec::new()
        } else {
            vec![subtree.to_string()]
        };
        LogRange::Path { start, end, paths }
    }
}

/// Repository history capability consumed by the version engine
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures to [crate::error::MonobumpError::HistoryLookupFailed],
/// or [crate::error::MonobumpError::Tag] for tag creation and push.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): In-memory history for tests
pub trait Repository {
    /// Most recent tag reachable from HEAD, if any
    fn last_tag(&self) -> Result<Option<String>>;

    /// All tags with their creation dates, in no particular order
    fn tags(&self) -> Result<Vec<GitTag>>;

    /// History entries for a range, most recent first
    fn log(&self, range: &LogRange) -> Result<Vec<HistoryEntry>>;

    /// Hash of the most recent commit that modified `path` (repository-relative)
    fn last_file_commit(&self, path: &str) -> Result<Option<String>>;

    /// Content of `path` as of commit `hash`
    fn show_file(&self, hash: &str, path: &str) -> Result<Vec<u8>>;

    /// Create an annotated tag on HEAD
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push an existing tag to `remote`
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// Commit the current index on top of HEAD
    fn commit(&self, header: &str, body: &str, footer: &str) -> Result<()>;

    /// Name of the checked-out branch, `None` when HEAD is detached
    fn branch(&self) -> Result<Option<String>>;

    fn is_detached(&self) -> Result<bool>;

    /// Tags named `<relative_path>/v<semver>`, oldest first.
    ///
    /// Tags created at the same moment are ordered by version.
    fn component_tags(&self, relative_path: &str) -> Result<Vec<GitTag>> {
        let pattern = ComponentTagPattern::new(relative_path);
        let mut tags: Vec<(GitTag, Version)> = self
            .tags()?
            .into_iter()
            .filter_map(|tag| pattern.parse(&tag.name).map(|v| (tag, v)))
            .collect();

        tags.sort_by(|(a, av), (b, bv)| a.date.cmp(&b.date).then_with(|| av.cmp(bv)));
        Ok(tags.into_iter().map(|(tag, _)| tag).collect())
    }

    /// Newest component-scoped tag for `relative_path`
    fn last_component_tag(&self, relative_path: &str) -> Result<Option<String>> {
        Ok(self
            .component_tags(relative_path)?
            .pop()
            .map(|tag| tag.name))
    }

    /// Create `<relative_path>/v<version>` on HEAD, pushing it to `push_remote`
    /// when given. Returns the tag name.
    fn tag_for_component(
        &self,
        version: &Version,
        relative_path: &str,
        push_remote: Option<&str>,
    ) -> Result<String> {
        let name = ComponentTagPattern::new(relative_path).format(version);
        self.create_tag(&name, &format!("Version {}", version))?;
        if let Some(remote) = push_remote {
            self.push_tag(remote, &name)?;
        }
        Ok(name)
    }
}
