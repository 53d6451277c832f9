//! Account provisioning
//!
//! Accounts are created, never deleted. The service may report a creation
//! as succeeded before the account shows up in listings; when that happens
//! provisioning stops for this run.

use std::collections::HashSet;

use orgs_spec::OrgSpec;

use crate::model::Account;
use crate::plan::{Mutation, Plan};

/// Plan creation of spec accounts missing from the organization.
///
/// `created` holds the names of accounts whose creation request already
/// succeeded.
pub fn plan_account_creation(
    spec: &OrgSpec,
    accounts: &[Account],
    created: &HashSet<String>,
) -> Plan {
    let mut plan = Plan::new();

    for account_spec in &spec.accounts {
        if account_spec.is_absent() {
            tracing::debug!("Account '{}' is marked absent; skipping", account_spec.name);
            continue;
        }
        if accounts.iter().any(|a| a.name == account_spec.name) {
            continue;
        }
        if created.contains(&account_spec.name) {
            plan.warn(format!(
                "New account '{}' is not yet available",
                account_spec.name
            ));
            break;
        }

        match spec.email_for(account_spec) {
            Some(email) => plan.push(Mutation::CreateAccount {
                name: account_spec.name.clone(),
                email,
            }),
            None => plan.error(format!(
                "No Email or default_domain for account '{}'",
                account_spec.name
            )),
        }
    }

    plan
}

/// Live accounts missing from the spec's account list, sorted
pub fn unlisted_accounts(spec: &OrgSpec, accounts: &[Account]) -> Vec<String> {
    let mut names: Vec<String> = accounts
        .iter()
        .filter(|a| spec.account(&a.name).is_none())
        .map(|a| a.name.clone())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgs_spec::AccountSpec;
    use pretty_assertions::assert_eq;

    fn live(name: &str) -> Account {
        Account {
            id: format!("id-{}", name),
            name: name.to_string(),
            email: String::new(),
        }
    }

    fn spec() -> OrgSpec {
        OrgSpec::new("111111111111", "root", "FullAWSAccess")
            .with_domain("example.com")
            .with_account(AccountSpec::new("master"))
            .with_account(AccountSpec::new("svc-a").with_email("team-a@corp.test"))
            .with_account(AccountSpec::new("svc-b"))
    }

    #[test]
    fn test_missing_accounts_are_created_with_email() {
        let plan = plan_account_creation(&spec(), &[live("master")], &HashSet::new());
        assert_eq!(
            plan.mutations,
            vec![
                Mutation::CreateAccount {
                    name: "svc-a".into(),
                    email: "team-a@corp.test".into(),
                },
                Mutation::CreateAccount {
                    name: "svc-b".into(),
                    email: "svc-b@example.com".into(),
                },
            ]
        );
    }

    #[test]
    fn test_pending_account_stops_provisioning() {
        let created: HashSet<String> = ["svc-a".to_string()].into_iter().collect();
        let plan = plan_account_creation(&spec(), &[live("master")], &created);
        assert!(plan.is_empty());
        assert_eq!(plan.warnings, vec!["New account 'svc-a' is not yet available".to_string()]);
    }

    #[test]
    fn test_absent_account_is_skipped() {
        let spec = OrgSpec::new("111111111111", "root", "FullAWSAccess")
            .with_domain("example.com")
            .with_account(AccountSpec {
                ensure: orgs_spec::Ensure::Absent,
                ..AccountSpec::new("retired")
            });
        let plan = plan_account_creation(&spec, &[], &HashSet::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unlisted_accounts() {
        let names = unlisted_accounts(&spec(), &[live("zeta"), live("master"), live("alpha")]);
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
