use regex::Regex;
use std::sync::OnceLock;

const HEADER_PATTERN: &str = r"^([A-Za-z]+)(?:\(([^)]*)\))?(!?):\s*(.*)$";
const BREAKING_FOOTERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(HEADER_PATTERN).ok()).as_ref()
}

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitMessage {
    /// Lowercased commit type, empty for non-conventional messages
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

impl CommitMessage {
    /// Parse a commit message according to conventional commits.
    ///
    /// Supports formats:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    ///
    /// plus a `BREAKING CHANGE:` / `BREAKING-CHANGE:` footer anywhere in the body.
    pub fn parse(message: &str) -> Self {
        let header = message.lines().next().unwrap_or("").trim_end();
        let breaking_footer = message
            .lines()
            .skip(1)
            .any(|line| BREAKING_FOOTERS.iter().any(|f| line.starts_with(f)));

        let Some(captures) = header_regex().and_then(|re| re.captures(header)) else {
            return CommitMessage {
                description: header.to_string(),
                is_breaking_change: breaking_footer,
                ..CommitMessage::default()
            };
        };

        let r#type = captures
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default();
        let scope = captures
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty());
        let has_exclamation = captures.get(3).map(|m| m.as_str()) == Some("!");
        let description = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        CommitMessage {
            r#type,
            scope,
            description,
            is_breaking_change: has_exclamation || breaking_footer,
        }
    }

    /// Whether the message followed the conventional format at all
    pub fn is_conventional(&self) -> bool {
        !self.r#type.is_empty()
    }
}
