//! Command implementations for orgs-cli

pub mod accounts;
pub mod organization;
pub mod report;

use std::path::Path;

use colored::Colorize;

use orgs_core::RunReport;
use orgs_spec::{OrgSpec, SpecLoader};

use crate::error::Result;

pub use accounts::{run_accounts_create, run_accounts_report};
pub use organization::run_organization;
pub use report::run_report;

/// Load and validate a spec file
pub fn load_spec(path: &Path) -> Result<OrgSpec> {
    Ok(SpecLoader::new().load(path)?)
}

/// Human-readable summary of a run
pub fn render_run_report(report: &RunReport) -> String {
    let mut lines = Vec::new();

    if report.actions.is_empty() {
        lines.push(format!(
            "{} Organization matches the spec. No changes needed.",
            "OK".green().bold()
        ));
    } else {
        lines.push(format!("{} Changes:", "=>".blue().bold()));
        for action in &report.actions {
            lines.push(format!("   {} {}", "+".green(), action));
        }
    }

    if !report.warnings.is_empty() {
        lines.push(format!("{} Warnings:", "WARN".yellow().bold()));
        for warning in &report.warnings {
            lines.push(format!("   {} {}", "!".yellow(), warning));
        }
    }

    if !report.errors.is_empty() {
        lines.push(format!("{} Refused:", "ERROR".red().bold()));
        for error in &report.errors {
            lines.push(format!("   {} {}", "x".red(), error));
        }
    }

    if let Some(unmanaged) = report.unmanaged.as_ref().filter(|u| !u.is_empty()) {
        lines.push(format!("{} Unmanaged:", "UNMANAGED".yellow().bold()));
        for (kind, names) in [
            ("accounts", &unmanaged.accounts),
            ("OUs", &unmanaged.ous),
            ("policies", &unmanaged.policies),
        ] {
            if !names.is_empty() {
                lines.push(format!("   {} {}: {}", "-".yellow(), kind, names.join(", ")));
            }
        }
    }

    if !report.mode.is_apply() && report.has_changes() {
        lines.push(String::new());
        lines.push(format!("Run again with {} to apply.", "--exec".cyan()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgs_core::{ExecutionMode, UnmanagedResources};
    use orgs_test_utils::TestSpecFile;

    #[test]
    fn test_render_clean_run() {
        let report = RunReport::new(ExecutionMode::Apply);
        let text = render_run_report(&report);
        assert!(text.contains("No changes needed"));
        assert!(!text.contains("--exec"));
    }

    #[test]
    fn test_render_dry_run_lists_everything() {
        let mut report = RunReport::new(ExecutionMode::Plan);
        report.actions.push("[dry-run] Create OU 'Eng'".into());
        report.warnings.push("Account 'ghost' not yet in Organization".into());
        report.errors.push("Can not delete OU 'Legacy'".into());
        report.unmanaged = Some(UnmanagedResources {
            accounts: vec!["stray".into()],
            ..UnmanagedResources::default()
        });

        let text = render_run_report(&report);
        assert!(text.contains("[dry-run] Create OU 'Eng'"));
        assert!(text.contains("Account 'ghost' not yet in Organization"));
        assert!(text.contains("Can not delete OU 'Legacy'"));
        assert!(text.contains("accounts: stray"));
        assert!(!text.contains("OUs:"));
        assert!(text.contains("--exec"));
    }

    #[test]
    fn test_load_spec_reports_invalid_file() {
        let file = TestSpecFile::yaml("master_account_id: [");
        assert!(load_spec(file.path()).is_err());
    }
}
