//! Configuration checks run before any mutation

use std::collections::BTreeMap;

use orgs_spec::{OrgSpec, OuSpec};

use crate::error::{AccountConflict, Error, Result};

/// Ensure no account is assigned to more than one OU in the spec tree.
///
/// Every conflict is logged; the returned error lists all of them with the
/// OU names involved.
pub fn validate_accounts_unique(root: &OuSpec) -> Result<()> {
    let mut placements: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    root.walk(&mut |ou| {
        for account in &ou.accounts {
            placements
                .entry(account.as_str())
                .or_default()
                .push(ou.name.clone());
        }
    });

    let conflicts: Vec<AccountConflict> = placements
        .into_iter()
        .filter(|(_, ous)| ous.len() > 1)
        .map(|(account, ous)| AccountConflict {
            account: account.to_string(),
            ous,
        })
        .collect();

    if conflicts.is_empty() {
        return Ok(());
    }

    for conflict in &conflicts {
        tracing::error!(
            "Account '{}' set in multiple OU: {}",
            conflict.account,
            conflict.ous.join(", ")
        );
    }
    tracing::error!("Invalid org spec: do not assign accounts to multiple Organizational Units");
    Err(Error::AccountsNotUnique { conflicts })
}

/// Ensure every OU only references policies the spec defines.
///
/// Absent OUs are skipped; their attachments are never touched.
pub fn validate_policy_references(spec: &OrgSpec) -> Result<()> {
    let mut found = Ok(());
    for root in &spec.organizational_units {
        root.walk(&mut |ou| {
            if found.is_err() || ou.is_absent() {
                return;
            }
            for policy in &ou.sc_policies {
                if *policy == spec.default_policy {
                    continue;
                }
                match spec.policy(policy) {
                    Some(p) if p.is_absent() => {
                        found = Err(Error::AbsentPolicyReference {
                            ou: ou.name.clone(),
                            policy: policy.clone(),
                        });
                        return;
                    }
                    Some(_) => {}
                    None => {
                        found = Err(Error::UndefinedPolicy {
                            ou: ou.name.clone(),
                            policy: policy.clone(),
                        });
                        return;
                    }
                }
            }
        });
    }
    found
}

/// Ensure the spec targets the organization we are connected to.
pub fn validate_master_account(spec: &OrgSpec, actual: &str) -> Result<()> {
    if spec.master_account_id == actual {
        Ok(())
    } else {
        Err(Error::MasterAccountMismatch {
            expected: spec.master_account_id.clone(),
            actual: actual.to_string(),
        })
    }
}
