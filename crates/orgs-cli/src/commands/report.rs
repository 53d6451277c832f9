//! The report command: print the live organization

use colored::Colorize;

use orgs_core::{EngineOptions, OrgClient, OrgEngine};

use crate::error::Result;

/// Run the report command
pub fn run_report<C: OrgClient + ?Sized>(client: &C) -> Result<()> {
    println!("{} Reading organization...", "=>".blue().bold());
    let report = OrgEngine::new(client, EngineOptions::plan()).report()?;
    println!("{}", report.render());
    Ok(())
}
