//! User interface module - terminal output.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Printing to stdout/stderr

pub mod formatter;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{ComponentReport, Outcome};

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{}", formatter::format_error(message));
}

/// Print a boundary warning to stderr.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{}", formatter::format_boundary_warning(warning));
}

/// Print every report, its warnings first.
///
/// When tags were created locally for a remote that was not pushed to, a
/// reminder of the push command follows.
pub fn display_reports(reports: &[ComponentReport], remote: Option<&str>) {
    for report in reports {
        for warning in &report.warnings {
            display_boundary_warning(warning);
        }
        println!("{}", formatter::format_report(report));
    }

    if let Some(remote) = remote {
        for report in reports {
            if let Outcome::Tagged { tag, pushed: false } = &report.outcome {
                println!("{}", formatter::format_manual_push_instruction(tag, remote));
            }
        }
    }
}
