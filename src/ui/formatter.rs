//! Pure formatting functions for UI output.
//!
//! Everything here returns a `String` so it can be tested; printing lives in
//! the parent module. Styling comes from `console`, which drops the escape
//! codes when the output is not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{ComponentReport, Outcome};

/// Red `ERROR:` prefix followed by the message
pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

/// Yellow warning icon followed by the warning
pub fn format_boundary_warning(warning: &BoundaryWarning) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow(), warning)
}

/// One line describing what a workflow did with a component
pub fn format_report(report: &ComponentReport) -> String {
    let name = style(&report.name).bold();
    let current = report.current.original();
    let next = report
        .next
        .as_ref()
        .map(|v| v.original().to_string())
        .unwrap_or_else(|| current.to_string());

    match &report.outcome {
        Outcome::Discovered => {
            let path = if report.relative_path.is_empty() {
                "."
            } else {
                report.relative_path.as_str()
            };
            format!("{}: {} ({})", name, current, style(path).dim())
        }
        Outcome::Unchanged => format!("{}: {} {}", name, current, style("(no change)").dim()),
        Outcome::Pending => format!("{}: {} → {}", name, current, style(next).green()),
        Outcome::Written { file } => format!(
            "{} {}: {} written to {}",
            style("✓").green(),
            name,
            style(next).green(),
            file.display()
        ),
        Outcome::Tagged { tag, pushed } => {
            let suffix = if *pushed { " (pushed)" } else { "" };
            format!(
                "{} {}: {}{} {}",
                style("✓").green(),
                name,
                style(tag).cyan(),
                suffix,
                tag_origin(report)
            )
        }
        Outcome::WouldTag { tag } => {
            format!(
                "{}: would create {} {}",
                name,
                style(tag).cyan(),
                tag_origin(report)
            )
        }
        Outcome::TagExists { tag } => {
            format!("{}: {} {}", name, tag, style("(exists)").dim())
        }
        Outcome::Tags(tags) if tags.is_empty() => {
            format!("{}: {}", name, style("no tags").dim())
        }
        Outcome::Tags(tags) => {
            let mut out = format!("{}:", name);
            for tag in tags {
                out.push_str(&format!(
                    "\n  {}  {}",
                    tag.name,
                    style(tag.date.format("%Y-%m-%d")).dim()
                ));
            }
            out
        }
        Outcome::ChangelogWritten { file, releases } => format!(
            "{} {}: changelog with {} release(s) written to {}",
            style("✓").green(),
            name,
            releases,
            file.display()
        ),
        Outcome::NoChangelogEntries => {
            format!("{}: {}", name, style("no changelog entries, skipping").dim())
        }
    }
}

/// Whether a tag carries a freshly bumped version or the one already on disk
fn tag_origin(report: &ComponentReport) -> String {
    match &report.next {
        Some(next) if next != &report.current => style(format!(
            "(bumped {} → {})",
            report.current.original(),
            next.original()
        ))
        .dim()
        .to_string(),
        _ => style(format!(
            "(current version {}, not bumped)",
            report.current.original()
        ))
        .yellow()
        .to_string(),
    }
}

/// Shell command to push a tag that was created locally
pub fn format_manual_push_instruction(tag: &str, remote: &str) -> String {
    format!(
        "{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan()
    )
}
