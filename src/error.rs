use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for monobump operations
#[derive(Error, Debug)]
pub enum MonobumpError {
    #[error("Invalid versioning-file glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("No files matched versioning-file pattern '{pattern}'")]
    NoComponentsFound { pattern: String },

    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("Key '{key}' not found")]
    KeyNotFound { key: String },

    #[error("Value at '{key}' is not a map")]
    NotAMap { key: String },

    #[error("Value at path '{path}' is not a string")]
    NotAString { path: String },

    #[error("Invalid semantic version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("History lookup failed: {0}")]
    HistoryLookupFailed(String),

    #[error("Document I/O failed for {}: {reason}", path.display())]
    DocumentIoFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("{}: {source}", file.display())]
    InFile {
        file: PathBuf,
        #[source]
        source: Box<MonobumpError>,
    },
}

/// Convenience type alias for Results in monobump
pub type Result<T> = std::result::Result<T, MonobumpError>;

impl From<git2::Error> for MonobumpError {
    fn from(err: git2::Error) -> Self {
        MonobumpError::HistoryLookupFailed(err.message().to_string())
    }
}

impl MonobumpError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        MonobumpError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        MonobumpError::Tag(msg.into())
    }

    /// Create a history lookup error with context
    pub fn history(msg: impl Into<String>) -> Self {
        MonobumpError::HistoryLookupFailed(msg.into())
    }

    pub fn malformed_path(path: &str, reason: impl Into<String>) -> Self {
        MonobumpError::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn document_io(path: &Path, reason: impl ToString) -> Self {
        MonobumpError::DocumentIoFailed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Attach the document that produced this error.
    ///
    /// Errors already carrying a file are returned unchanged.
    pub fn in_file(self, file: &Path) -> Self {
        match self {
            MonobumpError::InFile { .. } | MonobumpError::DocumentIoFailed { .. } => self,
            other => MonobumpError::InFile {
                file: file.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// Strip `InFile` context wrappers.
    pub fn root_cause(&self) -> &MonobumpError {
        match self {
            MonobumpError::InFile { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonobumpError::config("monorepo.versioning-file is not configured");
        assert_eq!(
            err.to_string(),
            "Configuration error: monorepo.versioning-file is not configured"
        );
    }

    #[test]
    fn test_error_from_git2() {
        let git_err = git2::Error::from_str("object not found");
        let err: MonobumpError = git_err.into();
        assert!(matches!(err, MonobumpError::HistoryLookupFailed(_)));
        assert!(err.to_string().contains("object not found"));
    }

    #[test]
    fn test_in_file_wraps_once() {
        let err = MonobumpError::KeyNotFound {
            key: "version".to_string(),
        }
        .in_file(Path::new("alpha/package.json"))
        .in_file(Path::new("other.json"));

        assert_eq!(err.to_string(), "alpha/package.json: Key 'version' not found");
        assert!(matches!(err.root_cause(), MonobumpError::KeyNotFound { .. }));
    }

    #[test]
    fn test_document_io_is_not_wrapped() {
        let err = MonobumpError::document_io(Path::new("a.yml"), "parse YAML: bad")
            .in_file(Path::new("a.yml"));
        assert!(matches!(err, MonobumpError::DocumentIoFailed { .. }));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (
                MonobumpError::InvalidGlob {
                    pattern: "[".to_string(),
                    reason: "x".to_string(),
                },
                "Invalid versioning-file glob",
            ),
            (
                MonobumpError::NoComponentsFound {
                    pattern: "*/x.yml".to_string(),
                },
                "No files matched",
            ),
            (MonobumpError::malformed_path("a[", "x"), "Malformed path"),
            (
                MonobumpError::NotAString {
                    path: "version".to_string(),
                },
                "Value at path",
            ),
            (MonobumpError::history("x"), "History lookup failed"),
            (MonobumpError::tag("x"), "Tag error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
