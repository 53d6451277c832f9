//! Account commands: list and provision accounts

use colored::Colorize;

use orgs_core::report::render_accounts;
use orgs_core::{EngineOptions, OrgClient, OrgEngine, RunReport};
use orgs_spec::OrgSpec;

use super::render_run_report;
use crate::error::Result;

/// Run the accounts report command
pub fn run_accounts_report<C: OrgClient + ?Sized>(client: &C) -> Result<()> {
    let accounts = OrgEngine::new(client, EngineOptions::plan()).account_report()?;
    println!("{} {} accounts", "=>".blue().bold(), accounts.len());
    println!("{}", render_accounts(&accounts));
    Ok(())
}

/// Run the accounts create command
pub fn run_accounts_create<C: OrgClient + ?Sized>(
    client: &C,
    spec: &OrgSpec,
    options: EngineOptions,
) -> Result<RunReport> {
    println!("{} Provisioning accounts...", "=>".blue().bold());
    let report = OrgEngine::new(client, options).accounts(spec)?;
    println!("{}", render_run_report(&report));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use orgs_core::PollConfig;
    use orgs_spec::{AccountSpec, OuSpec};
    use orgs_test_utils::{DEFAULT_POLICY, FakeOrganization, MASTER_ACCOUNT_ID};
    use pretty_assertions::assert_eq;

    fn spec() -> OrgSpec {
        OrgSpec::new(MASTER_ACCOUNT_ID, "root", DEFAULT_POLICY)
            .with_domain("example.com")
            .with_account(AccountSpec::new("master"))
            .with_account(AccountSpec::new("svc-a"))
            .with_root(OuSpec::new("root").with_accounts(&["master"]))
    }

    #[test]
    fn test_create_in_apply_mode() {
        let org = FakeOrganization::new();
        let options = EngineOptions::apply().with_poll(PollConfig {
            interval: Duration::ZERO,
            attempts: 2,
        });

        let report = run_accounts_create(&org, &spec(), options).unwrap();

        assert!(org.has_account("svc-a"));
        assert!(report.success());
        assert_eq!(report.mutations(), 1);
    }

    #[test]
    fn test_create_in_plan_mode() {
        let org = FakeOrganization::new();

        let report = run_accounts_create(&org, &spec(), EngineOptions::plan()).unwrap();

        assert!(!org.has_account("svc-a"));
        assert_eq!(report.mutations(), 0);
        assert_eq!(report.actions.len(), 1);
    }

    #[test]
    fn test_accounts_report_is_read_only() {
        let org = FakeOrganization::new();
        org.add_account("svc-a", "root");

        run_accounts_report(&org).unwrap();

        assert!(org.mutations().is_empty());
    }
}
