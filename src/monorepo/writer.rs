use tracing::info;

use crate::document::{read_document, write_document, DocumentPath, Node};
use crate::domain::{Component, Version};
use crate::error::Result;

/// Store `version` at `version_path` in the component's versioning document.
///
/// The document is re-read from disk so edits made since discovery survive.
/// Other values are preserved; comments and formatting are not.
pub fn write_version(
    component: &Component,
    version: &Version,
    version_path: &DocumentPath,
) -> Result<()> {
    let file = &component.versioning_file_path;
    let mut doc = read_document(file)?;
    version_path
        .set(&mut doc, Node::string(version.original()))
        .map_err(|e| e.in_file(file))?;
    write_document(file, &doc)?;

    info!(component = %component.name, version = %version.original(), file = %file.display(), "wrote version");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonobumpError;
    use crate::monorepo::discovery::read_version;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn component_at(file: &Path) -> Component {
        Component {
            name: "alpha".to_string(),
            root_path: file.parent().unwrap().to_path_buf(),
            versioning_file_path: file.to_path_buf(),
            current_version: Version::new(1, 0, 0),
        }
    }

    #[test]
    fn test_write_then_read_json() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("package.json");
        fs::write(
            &file,
            r#"{"name": "alpha", "version": "1.0.0", "dependencies": {"x": "^1"}}"#,
        )
        .unwrap();

        let path = DocumentPath::parse("version").unwrap();
        write_version(&component_at(&file), &Version::new(1, 1, 0), &path).unwrap();

        assert_eq!(read_version(&file, &path).unwrap(), Version::new(1, 1, 0));
        let text = fs::read_to_string(&file).unwrap();
        assert_eq!(
            text,
            "{\n  \"name\": \"alpha\",\n  \"version\": \"1.1.0\",\n  \"dependencies\": {\n    \"x\": \"^1\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_write_nested_yaml_keeps_prefix() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("catalog-info.yaml");
        fs::write(
            &file,
            "metadata:\n  name: alpha\n  annotations:\n    backstage.io/version: v1.0.0\nspec:\n  owner: team\n",
        )
        .unwrap();

        let path = DocumentPath::parse(r#"metadata.annotations["backstage.io/version"]"#).unwrap();
        let next = Version::parse_prefixed("v1.0.0")
            .unwrap()
            .bump(crate::domain::VersionBump::Patch)
            .unwrap();
        write_version(&component_at(&file), &next, &path).unwrap();

        let written = read_version(&file, &path).unwrap();
        assert_eq!(written.original(), "v1.0.1");
        let text = fs::read_to_string(&file).unwrap();
        assert!(text.contains("owner: team"));
    }

    #[test]
    fn test_write_missing_key_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("version.yml");
        fs::write(&file, "name: alpha\n").unwrap();

        let path = DocumentPath::parse("version").unwrap();
        let err = write_version(&component_at(&file), &Version::new(2, 0, 0), &path).unwrap_err();
        assert!(matches!(err.root_cause(), MonobumpError::KeyNotFound { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "name: alpha\n");
    }

    #[test]
    fn test_write_rereads_disk() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("version.yml");
        fs::write(&file, "version: 1.0.0\n").unwrap();
        let component = component_at(&file);

        fs::write(&file, "version: 1.0.0\nextra: added-later\n").unwrap();
        let path = DocumentPath::parse("version").unwrap();
        write_version(&component, &Version::new(1, 0, 1), &path).unwrap();

        let text = fs::read_to_string(&file).unwrap();
        assert!(text.contains("extra: added-later"));
        assert_eq!(read_version(&file, &path).unwrap(), Version::new(1, 0, 1));
    }
}
