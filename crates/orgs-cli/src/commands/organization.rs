//! The organization command: converge the organization to a spec

use colored::Colorize;

use orgs_core::{EngineOptions, OrgClient, OrgEngine, RunReport};
use orgs_spec::OrgSpec;

use super::render_run_report;
use crate::error::Result;

/// Run the organization command
///
/// Prints the run summary, or the full report as JSON with `json`.
pub fn run_organization<C: OrgClient + ?Sized>(
    client: &C,
    spec: &OrgSpec,
    options: EngineOptions,
    json: bool,
) -> Result<RunReport> {
    if !json {
        let suffix = if options.mode.is_apply() {
            ""
        } else {
            " [dry-run]"
        };
        println!(
            "{} Reconciling organization{}...",
            "=>".blue().bold(),
            suffix
        );
    }

    let report = OrgEngine::new(client, options).organization(spec)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_run_report(&report));
    }
    Ok(report)
}
