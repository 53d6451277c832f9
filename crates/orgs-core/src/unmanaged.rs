//! Unmanaged-Resource Detector
//!
//! Anything live in the organization that the spec never names is reported.
//! Unmanaged accounts are also relocated to the default OU.

use serde::Serialize;

use crate::model::OrgSnapshot;
use crate::plan::{Mutation, OuRef, Plan};
use crate::reconcile::ManagedSet;

/// Live resource names outside the managed set, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnmanagedResources {
    pub accounts: Vec<String>,
    pub ous: Vec<String>,
    pub policies: Vec<String>,
}

impl UnmanagedResources {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.ous.is_empty() && self.policies.is_empty()
    }
}

/// Compare live inventory against the managed set and warn about the rest.
pub fn detect_unmanaged(snapshot: &OrgSnapshot, managed: &ManagedSet) -> UnmanagedResources {
    let mut accounts: Vec<String> = snapshot
        .accounts
        .iter()
        .filter(|a| !managed.accounts.contains(&a.name))
        .map(|a| a.name.clone())
        .collect();
    accounts.sort();

    let mut ous: Vec<String> = snapshot
        .ous()
        .into_iter()
        .filter(|ou| !ou.is_root() && !managed.ous.contains(&ou.name))
        .map(|ou| ou.name.clone())
        .collect();
    ous.sort();

    let mut policies: Vec<String> = snapshot
        .policies
        .iter()
        .filter(|p| !managed.policies.contains(&p.name))
        .map(|p| p.name.clone())
        .collect();
    policies.sort();

    let unmanaged = UnmanagedResources {
        accounts,
        ous,
        policies,
    };

    if !unmanaged.accounts.is_empty() {
        tracing::warn!(
            "Unmanaged accounts in Organization: {}",
            unmanaged.accounts.join(", ")
        );
    }
    if !unmanaged.ous.is_empty() {
        tracing::warn!(
            "Unmanaged OU in Organization: {}",
            unmanaged.ous.join(", ")
        );
    }
    if !unmanaged.policies.is_empty() {
        tracing::warn!(
            "Unmanaged service control policies in Organization: {}",
            unmanaged.policies.join(", ")
        );
    }

    unmanaged
}

/// Plan moves of unmanaged accounts into the default OU.
///
/// When the default OU does not exist live, or its name is shared by
/// several OUs, nothing is planned.
pub fn plan_unmanaged_placement(
    unmanaged: &UnmanagedResources,
    snapshot: &OrgSnapshot,
    default_ou: &str,
) -> Plan {
    let mut plan = Plan::new();
    if unmanaged.accounts.is_empty() {
        return plan;
    }

    let target = match snapshot.find_ous_by_name(default_ou).as_slice() {
        [target] => *target,
        [] => {
            plan.warn(format!(
                "Default OU '{}' does not exist. Unmanaged accounts stay where they are",
                default_ou
            ));
            return plan;
        }
        _ => {
            plan.warn(format!(
                "Default OU '{}' is ambiguous. Unmanaged accounts stay where they are",
                default_ou
            ));
            return plan;
        }
    };

    for name in &unmanaged.accounts {
        let (Some(account), Some(source)) =
            (snapshot.account(name), snapshot.parent_of_account(name))
        else {
            continue;
        };
        if source == target.id {
            continue;
        }
        plan.push(Mutation::MoveAccount {
            account: name.clone(),
            account_id: account.id.clone(),
            source: source.to_string(),
            destination: OuRef::Existing(target.id.clone()),
            ou_name: target.name.clone(),
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, OuNode, Policy};
    use pretty_assertions::assert_eq;

    fn snapshot() -> OrgSnapshot {
        let stray = OuNode {
            id: "ou-stray".into(),
            name: "Stray".into(),
            parent_id: Some("r-1".into()),
            accounts: vec!["rogue".into()],
            policies: vec!["FullAWSAccess".into()],
            children: Vec::new(),
        };
        let parking = OuNode {
            id: "ou-park".into(),
            name: "Parking".into(),
            parent_id: Some("r-1".into()),
            accounts: vec!["parked".into()],
            policies: vec!["FullAWSAccess".into()],
            children: Vec::new(),
        };
        let root = OuNode {
            id: "r-1".into(),
            name: "root".into(),
            parent_id: None,
            accounts: vec!["master".into()],
            policies: vec!["FullAWSAccess".into()],
            children: vec![parking, stray],
        };
        let account = |id: &str, name: &str| Account {
            id: id.into(),
            name: name.into(),
            email: String::new(),
        };
        OrgSnapshot {
            root_id: "r-1".into(),
            accounts: vec![
                account("1", "master"),
                account("2", "rogue"),
                account("3", "parked"),
            ],
            policies: vec![
                Policy {
                    id: "p-1".into(),
                    name: "FullAWSAccess".into(),
                    description: String::new(),
                },
                Policy {
                    id: "p-2".into(),
                    name: "Hand-made".into(),
                    description: String::new(),
                },
            ],
            tree: root,
        }
    }

    fn managed() -> ManagedSet {
        let mut managed = ManagedSet::default();
        managed.accounts.insert("master".into());
        managed.ous.insert("root".into());
        managed.ous.insert("Parking".into());
        managed.policies.insert("FullAWSAccess".into());
        managed
    }

    #[test]
    fn test_detect_unmanaged() {
        let unmanaged = detect_unmanaged(&snapshot(), &managed());
        assert_eq!(
            unmanaged,
            UnmanagedResources {
                accounts: vec!["parked".into(), "rogue".into()],
                ous: vec!["Stray".into()],
                policies: vec!["Hand-made".into()],
            }
        );
    }

    #[test]
    fn test_unmanaged_accounts_move_to_default_ou() {
        let snap = snapshot();
        let unmanaged = detect_unmanaged(&snap, &managed());
        let plan = plan_unmanaged_placement(&unmanaged, &snap, "Parking");

        // parked is already in the default OU
        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.mutations[0],
            Mutation::MoveAccount {
                account: "rogue".into(),
                account_id: "2".into(),
                source: "ou-stray".into(),
                destination: OuRef::Existing("ou-park".into()),
                ou_name: "Parking".into(),
            }
        );
    }

    #[test]
    fn test_ambiguous_default_ou_plans_nothing() {
        let mut snap = snapshot();
        let mut nested = snap.tree.children[1].clone();
        nested.id = "ou-park-2".into();
        nested.name = "Parking".into();
        nested.parent_id = Some("ou-stray".into());
        nested.accounts.clear();
        snap.tree.children[1].children.push(nested);

        let unmanaged = detect_unmanaged(&snap, &managed());
        let plan = plan_unmanaged_placement(&unmanaged, &snap, "Parking");

        assert!(plan.is_empty(), "{:?}", plan.mutations);
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("ambiguous"), "{}", plan.warnings[0]);
    }

    #[test]
    fn test_missing_default_ou_plans_nothing() {
        let snap = snapshot();
        let unmanaged = detect_unmanaged(&snap, &managed());
        let plan = plan_unmanaged_placement(&unmanaged, &snap, "Nowhere");
        assert!(plan.is_empty());
        assert_eq!(plan.warnings.len(), 1);
    }
}
