use crate::error::{MonobumpError, Result};
use crate::git::{GitTag, HistoryEntry, LogRange};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use git2::{Commit, DiffOptions, Oid, Repository as Git2Repo, Sort};
use std::collections::HashMap;
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| MonobumpError::history("repository has no working tree"))
    }

    fn resolve_commit(&self, revision: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| {
                MonobumpError::history(format!("cannot resolve '{}': {}", revision, e.message()))
            })
    }

    /// HEAD commit, `None` for a repository without commits
    fn head_oid(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Walk from `end` (or HEAD) back to, but excluding, `start`
    fn walk(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        paths: &[String],
        dates: Option<(Option<NaiveDate>, Option<NaiveDate>)>,
    ) -> Result<Vec<HistoryEntry>> {
        let tip = match end {
            Some(rev) => self.resolve_commit(rev)?.id(),
            None => match self.head_oid()? {
                Some(oid) => oid,
                None => return Ok(Vec::new()),
            },
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(tip)?;
        if let Some(rev) = start {
            revwalk.hide(self.resolve_commit(rev)?.id())?;
        }

        let paths: Vec<&str> = paths
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();

        let mut entries = Vec::new();
        for oid_result in revwalk {
            let commit = self.repo.find_commit(oid_result?)?;

            if let Some((from, to)) = dates {
                let day = git_time(commit.time()).date_naive();
                if from.is_some_and(|from| day < from) || to.is_some_and(|to| day > to) {
                    continue;
                }
            }

            if !paths.is_empty() && !self.touches_paths(&commit, &paths)? {
                continue;
            }

            entries.push(history_entry(&commit));
        }

        Ok(entries)
    }

    /// Whether `commit` changed anything under `paths` relative to its first parent
    fn touches_paths(&self, commit: &Commit<'_>, paths: &[&str]) -> Result<bool> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        for path in paths {
            opts.pathspec(*path);
        }

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        Ok(diff.deltas().len() > 0)
    }

    fn tag_date(&self, reference: &git2::Reference<'_>) -> Result<DateTime<FixedOffset>> {
        if let Ok(tag) = reference.peel_to_tag() {
            if let Some(tagger) = tag.tagger() {
                return Ok(git_time(tagger.when()));
            }
        }
        Ok(git_time(reference.peel_to_commit()?.time()))
    }

    fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            // SSH key authentication
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                let username = username_from_url.unwrap_or("git");

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }

                // Try SSH agent as fallback
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            // Fall back to default credentials
            git2::Cred::default()
        });

        // Surface per-reference rejections as errors
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "push rejected for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        callbacks
    }
}

impl super::Repository for Git2Repository {
    fn last_tag(&self) -> Result<Option<String>> {
        let Some(head) = self.head_oid()? else {
            return Ok(None);
        };

        // Commit -> tag names, handles both lightweight and annotated tags
        let mut tag_oids: HashMap<Oid, Vec<String>> = HashMap::new();
        for name in self.repo.tag_names(None)?.iter().flatten() {
            if let Ok(reference) = self.repo.find_reference(&format!("refs/tags/{}", name)) {
                if let Ok(commit) = reference.peel_to_commit() {
                    tag_oids
                        .entry(commit.id())
                        .or_default()
                        .push(name.to_string());
                }
            }
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;

        for oid in revwalk {
            if let Some(names) = tag_oids.get(&oid?) {
                return Ok(names.iter().max().cloned());
            }
        }

        Ok(None)
    }

    fn tags(&self) -> Result<Vec<GitTag>> {
        let mut tags = Vec::new();
        for name in self.repo.tag_names(None)?.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            tags.push(GitTag {
                name: name.to_string(),
                date: self.tag_date(&reference)?,
            });
        }
        Ok(tags)
    }

    fn log(&self, range: &LogRange) -> Result<Vec<HistoryEntry>> {
        tracing::debug!(?range, "querying history");
        match range {
            LogRange::Tag { start, end } | LogRange::Hash { start, end } => {
                self.walk(start.as_deref(), end.as_deref(), &[], None)
            }
            LogRange::Date { start, end } => self.walk(None, None, &[], Some((*start, *end))),
            LogRange::Path { start, end, paths } => {
                self.walk(start.as_deref(), end.as_deref(), paths, None)
            }
        }
    }

    fn last_file_commit(&self, path: &str) -> Result<Option<String>> {
        let Some(head) = self.head_oid()? else {
            return Ok(None);
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            if self.touches_paths(&commit, &[path])? {
                return Ok(Some(commit.id().to_string()));
            }
        }
        Ok(None)
    }

    fn show_file(&self, hash: &str, path: &str) -> Result<Vec<u8>> {
        let commit = self.resolve_commit(hash)?;
        let entry = commit.tree()?.get_path(Path::new(path)).map_err(|e| {
            MonobumpError::history(format!("{} not present at {}: {}", path, hash, e.message()))
        })?;
        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;
        Ok(blob.content().to_vec())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| MonobumpError::tag(format!("Cannot resolve HEAD: {}", e)))?;
        let signature = self
            .repo
            .signature()
            .map_err(|e| MonobumpError::tag(format!("Cannot determine tagger: {}", e)))?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| MonobumpError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| MonobumpError::tag(format!("Cannot find remote '{}': {}", remote, e)))?;

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(Self::remote_callbacks());

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        remote_handle
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    MonobumpError::tag(format!("Network error during push: {}", e))
                }
                _ => MonobumpError::tag(format!("Failed to push tag '{}': {}", name, e)),
            })
    }

    fn commit(&self, header: &str, body: &str, footer: &str) -> Result<()> {
        let message = [header, body, footer]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut index = self.repo.index()?;
        // pick up changes staged through another handle or the git CLI
        index.read(false)?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = match self.head_oid()? {
            Some(oid) => Some(self.repo.find_commit(oid)?),
            None => None,
        };
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)?;
        Ok(())
    }

    fn branch(&self) -> Result<Option<String>> {
        let head = self.repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    fn is_detached(&self) -> Result<bool> {
        Ok(self.repo.head_detached()?)
    }
}

fn history_entry(commit: &Commit<'_>) -> HistoryEntry {
    HistoryEntry::new(
        commit.id().to_string(),
        commit.author().name().unwrap_or("unknown"),
        git_time(commit.time()),
        commit.message().unwrap_or(""),
    )
}

fn git_time(time: git2::Time) -> DateTime<FixedOffset> {
    let offset =
        FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}
