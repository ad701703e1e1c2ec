use crate::error::{MonobumpError, Result};
use crate::git::{GitTag, HistoryEntry, LogRange, Repository};
use chrono::{DateTime, Duration, FixedOffset};
use std::cell::RefCell;
use std::collections::BTreeMap;

struct MockCommit {
    entry: HistoryEntry,
    /// Files written by this commit and their new content
    files: BTreeMap<String, Vec<u8>>,
}

impl MockCommit {
    fn touches(&self, path: &str) -> bool {
        path.is_empty()
            || self.files.keys().any(|file| {
                file == path
                    || file
                        .strip_prefix(path)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

/// In-memory repository history for testing without actual git operations.
///
/// Commits form a single linear history; each one records the files it
/// wrote so snapshots and path-filtered logs can be answered.
pub struct MockRepository {
    commits: RefCell<Vec<MockCommit>>,
    tags: RefCell<Vec<(String, usize)>>,
    pushed: RefCell<Vec<(String, String)>>,
    staged: RefCell<BTreeMap<String, Vec<u8>>>,
    branch: Option<String>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `main`
    pub fn new() -> Self {
        MockRepository {
            commits: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
            pushed: RefCell::new(Vec::new()),
            staged: RefCell::new(BTreeMap::new()),
            branch: Some("main".to_string()),
        }
    }

    /// Simulate a detached HEAD
    pub fn detached(mut self) -> Self {
        self.branch = None;
        self
    }

    /// Append a commit writing `files`, returning its hash
    pub fn add_commit(&self, message: &str, files: &[(&str, &str)]) -> String {
        let mut commits = self.commits.borrow_mut();
        let index = commits.len();
        let hash = format!("{:040x}", index + 1);
        let entry = HistoryEntry::new(&hash, "Test Author", commit_date(index), message);
        commits.push(MockCommit {
            entry,
            files: files
                .iter()
                .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
                .collect(),
        });
        hash
    }

    /// Add a tag pointing at commit `hash`
    pub fn add_tag(&self, name: impl Into<String>, hash: &str) -> Result<()> {
        let index = self.index_of(hash)?;
        self.tags.borrow_mut().push((name.into(), index));
        Ok(())
    }

    /// Names of all tags, in creation order
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    /// `(remote, tag)` pairs pushed so far
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }

    /// Stage a file for the next [`Repository::commit`]
    pub fn stage(&self, path: &str, content: &str) {
        self.staged
            .borrow_mut()
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    /// Hash of the newest commit
    pub fn head(&self) -> Option<String> {
        self.commits.borrow().last().map(|c| c.entry.hash.clone())
    }

    /// Resolve a hash (or unique prefix) or tag name to a commit index
    fn index_of(&self, revision: &str) -> Result<usize> {
        if let Some((_, index)) = self.tags.borrow().iter().find(|(n, _)| n == revision) {
            return Ok(*index);
        }
        if revision.len() >= 7 {
            if let Some(index) = self
                .commits
                .borrow()
                .iter()
                .position(|c| c.entry.hash.starts_with(revision))
            {
                return Ok(index);
            }
        }
        Err(MonobumpError::history(format!(
            "unknown revision '{}'",
            revision
        )))
    }

    fn range_bounds(&self, start: Option<&str>, end: Option<&str>) -> Result<(usize, usize)> {
        let low = match start {
            Some(rev) => self.index_of(rev)? + 1,
            None => 0,
        };
        let high = match end {
            Some(rev) => self.index_of(rev)? + 1,
            None => self.commits.borrow().len(),
        };
        Ok((low, high.max(low)))
    }

    fn collect(
        &self,
        bounds: (usize, usize),
        keep: impl Fn(&MockCommit) -> bool,
    ) -> Vec<HistoryEntry> {
        self.commits.borrow()[bounds.0..bounds.1]
            .iter()
            .rev()
            .filter(|c| keep(c))
            .map(|c| c.entry.clone())
            .collect()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn last_tag(&self) -> Result<Option<String>> {
        Ok(self
            .tags
            .borrow()
            .iter()
            .max_by(|(a, ai), (b, bi)| ai.cmp(bi).then_with(|| a.cmp(b)))
            .map(|(name, _)| name.clone()))
    }

    fn tags(&self) -> Result<Vec<GitTag>> {
        Ok(self
            .tags
            .borrow()
            .iter()
            .map(|(name, index)| GitTag {
                name: name.clone(),
                date: commit_date(*index),
            })
            .collect())
    }

    fn log(&self, range: &LogRange) -> Result<Vec<HistoryEntry>> {
        match range {
            LogRange::Tag { start, end } | LogRange::Hash { start, end } => {
                let bounds = self.range_bounds(start.as_deref(), end.as_deref())?;
                Ok(self.collect(bounds, |_| true))
            }
            LogRange::Date { start, end } => {
                let bounds = self.range_bounds(None, None)?;
                Ok(self.collect(bounds, |c| {
                    let day = c.entry.date.date_naive();
                    start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e)
                }))
            }
            LogRange::Path { start, end, paths } => {
                let bounds = self.range_bounds(start.as_deref(), end.as_deref())?;
                Ok(self.collect(bounds, |c| {
                    paths.is_empty() || paths.iter().any(|p| c.touches(p))
                }))
            }
        }
    }

    fn last_file_commit(&self, path: &str) -> Result<Option<String>> {
        Ok(self
            .commits
            .borrow()
            .iter()
            .rev()
            .find(|c| c.files.contains_key(path))
            .map(|c| c.entry.hash.clone()))
    }

    fn show_file(&self, hash: &str, path: &str) -> Result<Vec<u8>> {
        let index = self.index_of(hash)?;
        self.commits.borrow()[..=index]
            .iter()
            .rev()
            .find_map(|c| c.files.get(path).cloned())
            .ok_or_else(|| MonobumpError::history(format!("{} not present at {}", path, hash)))
    }

    fn create_tag(&self, name: &str, _message: &str) -> Result<()> {
        if self.tags.borrow().iter().any(|(n, _)| n == name) {
            return Err(MonobumpError::tag(format!("tag '{}' already exists", name)));
        }
        let head = self
            .commits
            .borrow()
            .len()
            .checked_sub(1)
            .ok_or_else(|| MonobumpError::tag("Cannot resolve HEAD: no commits"))?;
        self.tags.borrow_mut().push((name.to_string(), head));
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        if !self.tags.borrow().iter().any(|(n, _)| n == name) {
            return Err(MonobumpError::tag(format!("no tag named '{}'", name)));
        }
        self.pushed
            .borrow_mut()
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }

    fn commit(&self, header: &str, body: &str, footer: &str) -> Result<()> {
        let message = [header, body, footer]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n");
        let files = std::mem::take(&mut *self.staged.borrow_mut());

        let mut commits = self.commits.borrow_mut();
        let index = commits.len();
        let hash = format!("{:040x}", index + 1);
        commits.push(MockCommit {
            entry: HistoryEntry::new(hash, "Test Author", commit_date(index), message),
            files,
        });
        Ok(())
    }

    fn branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn is_detached(&self) -> Result<bool> {
        Ok(self.branch.is_none())
    }
}

/// Deterministic commit dates: one day apart starting 2024-01-01
fn commit_date(index: usize) -> DateTime<FixedOffset> {
    let base = DateTime::parse_from_rfc3339("2024-01-01T12:00:00+00:00")
        .unwrap_or_default();
    base + Duration::days(index as i64)
}
