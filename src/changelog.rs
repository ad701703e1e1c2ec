//! Release notes and the markdown changelog rendered from them.
//!
//! Each release collects features, bug fixes and breaking changes from the
//! commits that make it up. Other commit types are left out.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::boundary::short_hash;
use crate::git::HistoryEntry;

/// File written next to each component's versioning document
pub const CHANGELOG_FILE_NAME: &str = "CHANGELOG.md";

/// Commit types listed in their own section, in rendering order
const SECTIONS: [(&str, &str); 2] = [("feat", "Features"), ("fix", "Bug Fixes")];

const BREAKING_SECTION: &str = "Breaking Changes";

/// One changelog line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub scope: Option<String>,
    pub description: String,
    pub hash: String,
}

impl NoteItem {
    fn from_entry(entry: &HistoryEntry) -> Self {
        NoteItem {
            scope: entry.message.scope.clone(),
            description: entry.message.description.clone(),
            hash: entry.hash.clone(),
        }
    }
}

/// Notes for a single release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNote {
    /// Heading, `v<version>` or the raw tag name
    pub title: String,
    /// Tag the release was cut from, `None` for an unreleased version
    pub tag: Option<String>,
    pub date: NaiveDate,
    /// `(section title, items)` for every section with at least one item
    pub sections: Vec<(String, Vec<NoteItem>)>,
}

impl ReleaseNote {
    /// Group `entries` (most recent first) into sections
    pub fn new(
        title: impl Into<String>,
        tag: Option<String>,
        date: NaiveDate,
        entries: &[HistoryEntry],
    ) -> Self {
        let mut sections = Vec::new();
        for (commit_type, heading) in SECTIONS {
            let items: Vec<NoteItem> = entries
                .iter()
                .filter(|e| e.message.r#type == commit_type)
                .map(NoteItem::from_entry)
                .collect();
            if !items.is_empty() {
                sections.push((heading.to_string(), items));
            }
        }

        let breaking: Vec<NoteItem> = entries
            .iter()
            .filter(|e| e.message.is_breaking_change)
            .map(NoteItem::from_entry)
            .collect();
        if !breaking.is_empty() {
            sections.push((BREAKING_SECTION.to_string(), breaking));
        }

        ReleaseNote {
            title: title.into(),
            tag,
            date,
            sections,
        }
    }

    pub fn section(&self, heading: &str) -> Option<&[NoteItem]> {
        self.sections
            .iter()
            .find(|(title, _)| title == heading)
            .map(|(_, items)| items.as_slice())
    }
}

/// Render releases, newest first, as a markdown changelog
pub fn render(notes: &[ReleaseNote]) -> String {
    let mut out = String::from("# Changelog\n");
    for note in notes {
        let _ = write!(out, "\n## {} ({})\n", note.title, note.date.format("%Y-%m-%d"));
        for (heading, items) in &note.sections {
            let _ = write!(out, "\n### {}\n\n", heading);
            for item in items {
                out.push_str("- ");
                if let Some(scope) = &item.scope {
                    let _ = write!(out, "**{}:** ", scope);
                }
                let _ = writeln!(out, "{} ({})", item.description, short_hash(&item.hash));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn entry(hash: &str, message: &str) -> HistoryEntry {
        let date = DateTime::parse_from_rfc3339("2024-02-03T10:00:00+00:00").unwrap();
        HistoryEntry::new(hash, "dev", date, message)
    }

    fn day(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_release_note_groups_by_type() {
        let entries = vec![
            entry("a1b2c3d4e5", "fix(parser): trailing comma"),
            entry("b2c3d4e5f6", "docs: readme"),
            entry("c3d4e5f6a7", "feat!: new config format"),
            entry("d4e5f6a7b8", "feat(cli): add --all"),
        ];
        let note = ReleaseNote::new(
            "v2.0.0",
            Some("alpha/v2.0.0".to_string()),
            day("2024-02-03"),
            &entries,
        );

        let headings: Vec<_> = note.sections.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(headings, vec!["Features", "Bug Fixes", "Breaking Changes"]);
        assert_eq!(note.section("Features").unwrap().len(), 2);
        assert_eq!(
            note.section("Breaking Changes").unwrap()[0].description,
            "new config format"
        );
        assert!(note.section("Documentation").is_none());
    }

    #[test]
    fn test_release_note_without_listed_commits_has_no_sections() {
        let note = ReleaseNote::new("v1.0.1", None, day("2024-01-01"), &[entry("abc", "chore: x")]);
        assert!(note.sections.is_empty());
    }

    #[test]
    fn test_render_layout() {
        let newer = ReleaseNote::new(
            "v1.1.0",
            Some("alpha/v1.1.0".to_string()),
            day("2024-03-01"),
            &[
                entry("1234567890", "feat(api): search endpoint"),
                entry("abcdef0123", "fix: empty query"),
            ],
        );
        let older = ReleaseNote::new(
            "v1.0.0",
            Some("alpha/v1.0.0".to_string()),
            day("2024-01-15"),
            &[entry("0fedcba987", "chore: init")],
        );

        let text = render(&[newer, older]);
        assert_eq!(
            text,
            "# Changelog\n\
             \n## v1.1.0 (2024-03-01)\n\
             \n### Features\n\n\
             - **api:** search endpoint (1234567)\n\
             \n### Bug Fixes\n\n\
             - empty query (abcdef0)\n\
             \n## v1.0.0 (2024-01-15)\n"
        );
    }
}
