// tests/config_test.rs
use monobump::config::{load_config, Config};
use monobump::MonobumpError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.monorepo.versioning_file, None);
    assert_eq!(config.monorepo.path, "version");
    assert_eq!(config.tag.remote, "origin");
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[monorepo]
versioning-file = "*/Chart.yaml"

[versioning]
update-patch = ["fix"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.monorepo.versioning_file().unwrap(), "*/Chart.yaml");
    assert_eq!(config.monorepo.path, "version");
    assert_eq!(config.versioning.update_patch, vec!["fix"]);
    assert_eq!(config.versioning.update_minor, vec!["feat"]);
    assert!(config.versioning.ignore_unknown);
}

#[test]
fn test_load_json_monorepo_fixture() {
    let config = load_config(Some("tests/fixtures/monorepo_json.toml"))
        .expect("Failed to load test config");
    assert_eq!(
        config.monorepo.versioning_file.as_deref(),
        Some("packages/*/package.json")
    );
    assert_eq!(config.versioning.update_minor, vec!["feat", "feature"]);
    assert!(config.tag.push);
    assert_eq!(config.tag.remote, "upstream");
}

#[test]
fn test_load_backstage_fixture() {
    let config =
        load_config(Some("tests/fixtures/backstage.toml")).expect("Failed to load test config");
    assert_eq!(
        config.monorepo.path,
        r#"metadata.annotations["backstage.io/template-version"]"#
    );
    assert_eq!(config.versioning.update_major, vec!["breaking"]);
    assert_eq!(config.versioning.update_patch, vec!["fix", "chore"]);
    assert!(!config.versioning.ignore_unknown);
    assert!(!config.tag.push);
}

#[test]
fn test_invalid_file_is_config_error() {
    let err = load_config(Some("tests/fixtures/invalid.toml")).unwrap_err();
    assert!(matches!(err, MonobumpError::Config(_)));
    assert!(err.to_string().contains("invalid.toml"));
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let err = load_config(Some("tests/fixtures/does-not-exist.toml")).unwrap_err();
    assert!(matches!(err, MonobumpError::Config(_)));
}
