//! Locates component versioning documents and reads their current version.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::document::{decode, DocumentPath};
use crate::domain::{Component, Version};
use crate::error::{MonobumpError, Result};

/// Expand `pattern` relative to `repo_root` and build a [`Component`] for
/// every matching file.
///
/// Any unreadable document fails the whole discovery; directories matched by
/// the pattern are skipped.
pub fn find_components(
    repo_root: &Path,
    pattern: &str,
    version_path: &DocumentPath,
) -> Result<Vec<Component>> {
    let files = expand(repo_root, pattern)?;
    if files.is_empty() {
        return Err(MonobumpError::NoComponentsFound {
            pattern: pattern.to_string(),
        });
    }

    let mut components = Vec::with_capacity(files.len());
    for file in files {
        let current_version = read_version(&file, version_path).map_err(|e| e.in_file(&file))?;
        let root_path = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo_root.to_path_buf());
        let name = component_name(&root_path);

        debug!(component = %name, version = %current_version, file = %file.display(), "discovered component");
        components.push(Component {
            name,
            root_path,
            versioning_file_path: file,
            current_version,
        });
    }

    Ok(components)
}

/// Read and parse the version stored at `version_path` in the document at `file`
pub fn read_version(file: &Path, version_path: &DocumentPath) -> Result<Version> {
    let content = std::fs::read(file).map_err(|e| MonobumpError::document_io(file, e))?;
    read_version_from_bytes(file, &content, version_path)
}

/// Parse the version from document bytes. `file` selects the format.
///
/// The stored text may carry a leading `v`, which is kept for writing back.
pub fn read_version_from_bytes(
    file: &Path,
    content: &[u8],
    version_path: &DocumentPath,
) -> Result<Version> {
    let doc = decode(file, content)?;
    let text = version_path.get_str(&doc)?;
    Version::parse_prefixed(text)
}

fn expand(repo_root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let invalid = |reason: String| MonobumpError::InvalidGlob {
        pattern: pattern.to_string(),
        reason,
    };

    // Validate the user part on its own so errors point at their pattern.
    Pattern::new(pattern).map_err(|e| invalid(e.to_string()))?;

    let root = Pattern::escape(&repo_root.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern.trim_start_matches('/'));

    let mut files = Vec::new();
    for entry in glob::glob(&full).map_err(|e| invalid(e.to_string()))? {
        let path = entry.map_err(|e| MonobumpError::document_io(e.path(), e.error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn component_name(root_path: &Path) -> String {
    root_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn version_path() -> DocumentPath {
        DocumentPath::parse("version").unwrap()
    }

    #[test]
    fn test_finds_components_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "beta/package.json", r#"{"version": "2.0.0"}"#);
        write(dir.path(), "alpha/package.json", r#"{"version": "1.0.0"}"#);

        let components = find_components(dir.path(), "*/package.json", &version_path()).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].name, "alpha");
        assert_eq!(components[0].root_path, dir.path().join("alpha"));
        assert_eq!(
            components[0].versioning_file_path,
            dir.path().join("alpha/package.json")
        );
        assert_eq!(components[0].current_version, Version::new(1, 0, 0));
        assert_eq!(components[1].name, "beta");
    }

    #[test]
    fn test_single_level_wildcard() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "libs/foo/Chart.yaml", "version: 0.1.0\n");
        write(dir.path(), "libs/deep/nested/Chart.yaml", "version: 0.2.0\n");

        let components = find_components(dir.path(), "libs/*/Chart.yaml", &version_path()).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "foo");
    }

    #[test]
    fn test_keeps_v_prefix() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "svc/info.yaml", "version: v3.1.4\n");

        let components = find_components(dir.path(), "*/info.yaml", &version_path()).unwrap();
        assert_eq!(components[0].current_version.original(), "v3.1.4");
        assert_eq!(components[0].current_version, Version::new(3, 1, 4));
    }

    #[test]
    fn test_no_matches() {
        let dir = TempDir::new().unwrap();
        let err = find_components(dir.path(), "*/package.json", &version_path()).unwrap_err();
        assert!(matches!(err, MonobumpError::NoComponentsFound { .. }));
    }

    #[test]
    fn test_invalid_glob() {
        let dir = TempDir::new().unwrap();
        let err = find_components(dir.path(), "[*/package.json", &version_path()).unwrap_err();
        assert!(matches!(err, MonobumpError::InvalidGlob { .. }));
    }

    #[test]
    fn test_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("alpha/version.yml")).unwrap();
        write(dir.path(), "beta/version.yml", "version: 1.0.0\n");

        let components = find_components(dir.path(), "*/version.yml", &version_path()).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "beta");
    }

    #[test]
    fn test_one_bad_document_fails_all() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "alpha/package.json", r#"{"version": "1.0.0"}"#);
        write(dir.path(), "beta/package.json", r#"{"name": "beta"}"#);

        let err = find_components(dir.path(), "*/package.json", &version_path()).unwrap_err();
        assert!(err.to_string().contains("beta"));
        assert!(matches!(err.root_cause(), MonobumpError::KeyNotFound { .. }));
    }

    #[test]
    fn test_non_string_and_invalid_versions() {
        let path = version_path();
        let err = read_version_from_bytes(Path::new("a.json"), br#"{"version": 1}"#, &path)
            .unwrap_err();
        assert!(matches!(err, MonobumpError::NotAString { .. }));

        let err = read_version_from_bytes(Path::new("a.yml"), b"version: one\n", &path)
            .unwrap_err();
        assert!(matches!(err, MonobumpError::InvalidVersion { .. }));
    }

    #[test]
    fn test_read_version_from_bracketed_path() {
        let path = DocumentPath::parse(r#"metadata.annotations["backstage.io/version"]"#).unwrap();
        let yaml = b"metadata:\n  annotations:\n    backstage.io/version: 1.4.0\n";
        let version = read_version_from_bytes(Path::new("catalog-info.yaml"), yaml, &path).unwrap();
        assert_eq!(version, Version::new(1, 4, 0));
    }
}
