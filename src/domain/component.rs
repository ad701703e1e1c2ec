use crate::domain::{ComponentTagPattern, Version};
use std::path::{Component as PathComponent, Path, PathBuf};

/// An independently versioned subtree of the repository
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Base name of the directory holding the versioning document
    pub name: String,
    /// Directory holding the versioning document
    pub root_path: PathBuf,
    /// The versioning document itself
    pub versioning_file_path: PathBuf,
    /// Version read from the document at discovery time
    pub current_version: Version,
}

impl Component {
    /// Component root relative to `repo_root`, `/`-separated as git expects.
    ///
    /// Returns an empty string for a component at the repository root.
    pub fn relative_dir(&self, repo_root: &Path) -> String {
        relative_git_path(repo_root, &self.root_path)
    }

    /// Versioning document relative to `repo_root`, `/`-separated
    pub fn relative_file(&self, repo_root: &Path) -> String {
        relative_git_path(repo_root, &self.versioning_file_path)
    }

    pub fn tag_pattern(&self, repo_root: &Path) -> ComponentTagPattern {
        ComponentTagPattern::new(&self.relative_dir(repo_root))
    }
}

/// Express `path` relative to `base` with forward slashes.
///
/// Paths outside `base` are returned as given.
pub fn relative_git_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            PathComponent::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(root: &str) -> Component {
        let root_path = PathBuf::from(root);
        Component {
            name: root_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            versioning_file_path: root_path.join("package.json"),
            root_path,
            current_version: Version::new(1, 0, 0),
        }
    }

    #[test]
    fn test_relative_dir() {
        let c = component("/repo/libs/foo");
        assert_eq!(c.relative_dir(Path::new("/repo")), "libs/foo");
        assert_eq!(c.relative_file(Path::new("/repo")), "libs/foo/package.json");
    }

    #[test]
    fn test_relative_dir_of_root_component() {
        let c = component("/repo");
        assert_eq!(c.relative_dir(Path::new("/repo")), "");
        assert_eq!(c.tag_pattern(Path::new("/repo")).prefix(), "v");
    }

    #[test]
    fn test_tag_pattern_uses_relative_dir() {
        let c = component("/repo/libs/foo");
        assert_eq!(
            c.tag_pattern(Path::new("/repo")).format(&Version::new(1, 1, 0)),
            "libs/foo/v1.1.0"
        );
    }
}
