//! Organizational unit tree schema

use serde::{Deserialize, Serialize};

use super::{Ensure, null_as_empty};

/// Name of the top-level node of the OU tree
pub const ROOT_OU_NAME: &str = "root";

/// A node in the desired OU tree
///
/// # Example YAML
///
/// ```yaml
/// Name: Engineering
/// Accounts: [svc-a, svc-b]
/// SC_Policies: [DenyRoot]
/// Child_OU:
///   - Name: Platform
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OuSpec {
    /// OU name, unique among its siblings
    #[serde(rename = "Name")]
    pub name: String,
    /// Names of accounts that belong directly in this OU
    #[serde(rename = "Accounts", default, deserialize_with = "null_as_empty")]
    pub accounts: Vec<String>,
    /// Names of service control policies attached to this OU
    #[serde(rename = "SC_Policies", default, deserialize_with = "null_as_empty")]
    pub sc_policies: Vec<String>,
    /// Nested OUs
    #[serde(rename = "Child_OU", default, deserialize_with = "null_as_empty")]
    pub child_ou: Vec<OuSpec>,
    #[serde(rename = "Ensure", default)]
    pub ensure: Ensure,
}

impl OuSpec {
    /// Create an empty, present OU node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accounts: Vec::new(),
            sc_policies: Vec::new(),
            child_ou: Vec::new(),
            ensure: Ensure::Present,
        }
    }

    pub fn with_accounts(mut self, accounts: &[&str]) -> Self {
        self.accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_policies(mut self, policies: &[&str]) -> Self {
        self.sc_policies = policies.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_child(mut self, child: OuSpec) -> Self {
        self.child_ou.push(child);
        self
    }

    pub fn absent(mut self) -> Self {
        self.ensure = Ensure::Absent;
        self
    }

    pub fn is_absent(&self) -> bool {
        self.ensure.is_absent()
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_OU_NAME
    }

    /// Visit this node and every descendant, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a OuSpec)) {
        visit(self);
        for child in &self.child_ou {
            child.walk(visit);
        }
    }
}
