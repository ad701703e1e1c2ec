use std::fmt;

/// Non-fatal conditions met while resolving a component's next version.
/// These should be reported to the user but never abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No commits touched the component since its baseline
    NoNewCommits { component: String, baseline: String },
    /// The versioning document could not be read at the commit that last
    /// changed it; the on-disk version was used as the base instead
    HistoricalVersionUnreadable {
        component: String,
        commit: String,
        reason: String,
    },
    /// Tag carries the component prefix but no valid semantic version
    UnparsableTag { tag: String },
    /// The tag for the resolved version is already present
    TagAlreadyExists { tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                component,
                baseline,
            } => {
                write!(
                    f,
                    "No new commits for '{}' since {}",
                    component, baseline
                )
            }
            BoundaryWarning::HistoricalVersionUnreadable {
                component,
                commit,
                reason,
            } => {
                write!(
                    f,
                    "Cannot read version of '{}' at {}: {} (using current version)",
                    component,
                    short_hash(commit),
                    reason
                )
            }
            BoundaryWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': not a semantic version", tag)
            }
            BoundaryWarning::TagAlreadyExists { tag } => {
                write!(f, "Tag '{}' already exists, skipping", tag)
            }
        }
    }
}

/// First seven characters of a commit hash
pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
