use crate::domain::Version;

/// Naming convention for component-scoped tags: `<relative-path>/v<semver>`.
///
/// A component at the repository root (empty relative path) uses plain
/// `v<semver>` tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTagPattern {
    prefix: String,
}

impl ComponentTagPattern {
    /// Create the pattern for a component's path relative to the repository root
    pub fn new(relative_path: &str) -> Self {
        let relative_path = relative_path.trim_matches('/');
        let prefix = if relative_path.is_empty() {
            "v".to_string()
        } else {
            format!("{}/v", relative_path)
        };
        ComponentTagPattern { prefix }
    }

    /// Everything before the version digits, e.g. `libs/foo/v`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Format a version according to pattern.
    /// Example: path="libs/foo", version=1.2.3 -> "libs/foo/v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        format!("{}{}", self.prefix, version.canonical())
    }

    /// Extract the version embedded in a tag name belonging to this component
    pub fn parse(&self, tag: &str) -> Option<Version> {
        let version_part = tag.strip_prefix(&self.prefix)?;
        Version::parse(version_part).ok()
    }

    /// Whether a tag belongs to this component and embeds a valid version
    pub fn matches(&self, tag: &str) -> bool {
        self.parse(tag).is_some()
    }

    /// Whether a tag sits in this component's namespace, valid version or not.
    ///
    /// `alpha/vnext` belongs to `alpha`; `alpha/vendor/v1.0.0` does not.
    pub fn owns(&self, tag: &str) -> bool {
        tag.strip_prefix(&self.prefix)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
    }
}
