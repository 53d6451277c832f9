//! Top-level organization spec document

use serde::{Deserialize, Serialize};

use super::{AccountSpec, OuSpec, PolicySpec, null_as_empty, string_or_number};

/// The complete desired state of an organization
///
/// # Example YAML
///
/// ```yaml
/// master_account_id: "111111111111"
/// default_domain: example.com
/// default_ou: root
/// default_policy: FullAWSAccess
/// accounts:
///   - Name: svc-a
/// sc_policies:
///   - Name: DenyRoot
///     Effect: Deny
///     Actions: ["*"]
/// organizational_units:
///   - Name: root
///     Child_OU:
///       - Name: Engineering
///         Accounts: [svc-a]
///         SC_Policies: [DenyRoot]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrgSpec {
    /// Id of the organization's master (management) account
    #[serde(deserialize_with = "string_or_number")]
    pub master_account_id: String,
    /// Domain used to synthesize account emails
    #[serde(default)]
    pub default_domain: Option<String>,
    /// OU receiving accounts that the spec does not place
    pub default_ou: String,
    /// Baseline policy that is never detached or deleted
    pub default_policy: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub accounts: Vec<AccountSpec>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sc_policies: Vec<PolicySpec>,
    #[serde(deserialize_with = "null_as_empty")]
    pub organizational_units: Vec<OuSpec>,
}

impl OrgSpec {
    /// Create a spec with an empty `root` OU
    pub fn new(
        master_account_id: impl Into<String>,
        default_ou: impl Into<String>,
        default_policy: impl Into<String>,
    ) -> Self {
        Self {
            master_account_id: master_account_id.into(),
            default_domain: None,
            default_ou: default_ou.into(),
            default_policy: default_policy.into(),
            accounts: Vec::new(),
            sc_policies: Vec::new(),
            organizational_units: vec![OuSpec::new(super::ROOT_OU_NAME)],
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = Some(domain.into());
        self
    }

    pub fn with_account(mut self, account: AccountSpec) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_policy(mut self, policy: PolicySpec) -> Self {
        self.sc_policies.push(policy);
        self
    }

    /// Replace the OU tree with the given root node
    pub fn with_root(mut self, root: OuSpec) -> Self {
        self.organizational_units = vec![root];
        self
    }

    /// The `root` node of the OU tree
    pub fn root(&self) -> Option<&OuSpec> {
        self.organizational_units.iter().find(|ou| ou.is_root())
    }

    pub fn policy(&self, name: &str) -> Option<&PolicySpec> {
        self.sc_policies.iter().find(|p| p.name == name)
    }

    pub fn account(&self, name: &str) -> Option<&AccountSpec> {
        self.accounts.iter().find(|a| a.name == name)
    }

    /// Email for an account: the explicit one, else `<name>@<default_domain>`.
    pub fn email_for(&self, account: &AccountSpec) -> Option<String> {
        match (&account.email, &self.default_domain) {
            (Some(email), _) if !email.is_empty() => Some(email.clone()),
            (_, Some(domain)) => Some(format!("{}@{}", account.name, domain)),
            _ => None,
        }
    }
}
