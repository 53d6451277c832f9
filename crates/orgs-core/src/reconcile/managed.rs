//! Names declared by the spec

use std::collections::BTreeSet;

use serde::Serialize;

use orgs_spec::OrgSpec;

/// Names of every account, OU and policy the spec declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManagedSet {
    pub accounts: BTreeSet<String>,
    pub ous: BTreeSet<String>,
    pub policies: BTreeSet<String>,
}

impl ManagedSet {
    /// Collect managed names from the OU tree and the policy list.
    ///
    /// The default policy is always managed, even when the spec never
    /// mentions it.
    pub fn from_spec(spec: &OrgSpec) -> Self {
        let mut managed = Self::default();

        for root in &spec.organizational_units {
            root.walk(&mut |ou| {
                managed.ous.insert(ou.name.clone());
                managed.accounts.extend(ou.accounts.iter().cloned());
            });
        }

        managed
            .policies
            .extend(spec.sc_policies.iter().map(|p| p.name.clone()));
        managed.policies.insert(spec.default_policy.clone());

        managed
    }

    /// Policies that OUs may have attached: present spec policies plus the default
    pub fn attachable_policies(spec: &OrgSpec) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = spec
            .sc_policies
            .iter()
            .filter(|p| !p.is_absent())
            .map(|p| p.name.clone())
            .collect();
        names.insert(spec.default_policy.clone());
        names
    }
}
