//! Structural validation of an organization spec
//!
//! These checks only look at the document itself. Cross-references that
//! need the reconciliation context (account ownership across the OU tree,
//! policy references) are validated by the reconciler before any mutation.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::schema::{OrgSpec, OuSpec, ROOT_OU_NAME};

static ACCOUNT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{12}$").unwrap());
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").unwrap());

/// Validate a spec, returning one message per problem found.
///
/// An empty result means the spec is structurally sound.
pub fn validate(spec: &OrgSpec) -> Vec<String> {
    let mut issues = Vec::new();

    if !ACCOUNT_ID.is_match(&spec.master_account_id) {
        issues.push(format!(
            "master_account_id '{}' is not a 12 digit account id",
            spec.master_account_id
        ));
    }
    if spec.default_ou.trim().is_empty() {
        issues.push("default_ou must not be empty".to_string());
    }
    if spec.default_policy.trim().is_empty() {
        issues.push("default_policy must not be empty".to_string());
    }
    if let Some(domain) = &spec.default_domain
        && !DOMAIN.is_match(domain)
    {
        issues.push(format!("default_domain '{}' is not a valid domain", domain));
    }

    validate_accounts(spec, &mut issues);
    validate_policies(spec, &mut issues);

    match spec.organizational_units.as_slice() {
        [root] if root.name == ROOT_OU_NAME => {
            if root.is_absent() {
                issues.push("the root OU cannot be marked absent".to_string());
            }
            validate_ou(root, ROOT_OU_NAME, &mut issues);
        }
        [other] => issues.push(format!(
            "top-level OU must be named '{}', found '{}'",
            ROOT_OU_NAME, other.name
        )),
        [] => issues.push("organizational_units must contain the root OU".to_string()),
        _ => issues.push(format!(
            "organizational_units must contain exactly one top-level OU named '{}'",
            ROOT_OU_NAME
        )),
    }

    issues
}

fn validate_accounts(spec: &OrgSpec, issues: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for account in &spec.accounts {
        if account.name.trim().is_empty() {
            issues.push("account with empty Name".to_string());
            continue;
        }
        if !seen.insert(account.name.as_str()) {
            issues.push(format!("duplicate account '{}'", account.name));
        }
        match &account.email {
            Some(email) if !EMAIL.is_match(email) => {
                issues.push(format!(
                    "account '{}' has invalid Email '{}'",
                    account.name, email
                ));
            }
            None if spec.default_domain.is_none() && !account.is_absent() => {
                issues.push(format!(
                    "account '{}' has no Email and no default_domain is set",
                    account.name
                ));
            }
            _ => {}
        }
    }
}

fn validate_policies(spec: &OrgSpec, issues: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for policy in &spec.sc_policies {
        if policy.name.trim().is_empty() {
            issues.push("sc_policy with empty Name".to_string());
            continue;
        }
        if !seen.insert(policy.name.as_str()) {
            issues.push(format!("duplicate sc_policy '{}'", policy.name));
        }
        if policy.actions.is_empty() && !policy.is_absent() {
            issues.push(format!("sc_policy '{}' has no Actions", policy.name));
        }
    }
}

fn validate_ou(ou: &OuSpec, path: &str, issues: &mut Vec<String>) {
    let mut siblings = HashSet::new();
    for child in &ou.child_ou {
        if child.name.trim().is_empty() {
            issues.push(format!("OU under '{}' has an empty Name", path));
            continue;
        }
        if child.name == ROOT_OU_NAME {
            issues.push(format!("OU under '{}' cannot be named '{}'", path, ROOT_OU_NAME));
        }
        if !siblings.insert(child.name.as_str()) {
            issues.push(format!("duplicate OU '{}' under '{}'", child.name, path));
        }
        validate_ou(child, &format!("{}/{}", path, child.name), issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AccountSpec, Effect, PolicySpec};
    use rstest::rstest;

    fn valid_spec() -> OrgSpec {
        OrgSpec::new("111111111111", "root", "FullAWSAccess")
            .with_domain("example.com")
            .with_account(AccountSpec::new("svc-a"))
            .with_policy(PolicySpec::new("DenyRoot", Effect::Deny, &["*"]))
            .with_root(
                OuSpec::new("root").with_child(OuSpec::new("Engineering").with_accounts(&["svc-a"])),
            )
    }

    #[test]
    fn test_valid_spec_has_no_issues() {
        assert!(validate(&valid_spec()).is_empty());
    }

    #[rstest]
    #[case("12345", "12 digit")]
    #[case("abcdefghijkl", "12 digit")]
    fn test_bad_master_account_id(#[case] id: &str, #[case] expected: &str) {
        let mut spec = valid_spec();
        spec.master_account_id = id.to_string();
        let issues = validate(&spec);
        assert!(issues.iter().any(|i| i.contains(expected)), "{:?}", issues);
    }

    #[test]
    fn test_root_must_be_named_root() {
        let spec = valid_spec().with_root(OuSpec::new("top"));
        let issues = validate(&spec);
        assert!(issues.iter().any(|i| i.contains("must be named 'root'")));
    }

    #[test]
    fn test_root_cannot_be_absent() {
        let spec = valid_spec().with_root(OuSpec::new("root").absent());
        let issues = validate(&spec);
        assert!(issues.iter().any(|i| i.contains("cannot be marked absent")));
    }

    #[test]
    fn test_duplicate_sibling_ou() {
        let spec = valid_spec().with_root(
            OuSpec::new("root")
                .with_child(OuSpec::new("Eng"))
                .with_child(OuSpec::new("Eng")),
        );
        let issues = validate(&spec);
        assert_eq!(issues, vec!["duplicate OU 'Eng' under 'root'".to_string()]);
    }

    #[test]
    fn test_same_name_under_different_parents_is_allowed() {
        let spec = valid_spec().with_root(
            OuSpec::new("root")
                .with_child(OuSpec::new("A").with_child(OuSpec::new("Shared")))
                .with_child(OuSpec::new("B").with_child(OuSpec::new("Shared"))),
        );
        assert!(validate(&spec).is_empty());
    }

    #[test]
    fn test_duplicate_policy() {
        let spec = valid_spec().with_policy(PolicySpec::new("DenyRoot", Effect::Allow, &["s3:*"]));
        let issues = validate(&spec);
        assert!(issues.contains(&"duplicate sc_policy 'DenyRoot'".to_string()));
    }

    #[test]
    fn test_policy_without_actions() {
        let spec = valid_spec().with_policy(PolicySpec::new("Empty", Effect::Allow, &[]));
        let issues = validate(&spec);
        assert!(issues.contains(&"sc_policy 'Empty' has no Actions".to_string()));
    }

    #[test]
    fn test_account_without_email_or_domain() {
        let mut spec = valid_spec();
        spec.default_domain = None;
        let issues = validate(&spec);
        assert!(issues.iter().any(|i| i.contains("no default_domain")));
    }

    #[test]
    fn test_invalid_email() {
        let spec = valid_spec().with_account(AccountSpec::new("svc-b").with_email("not-an-email"));
        let issues = validate(&spec);
        assert!(issues.iter().any(|i| i.contains("invalid Email")));
    }

    #[test]
    fn test_duplicate_account() {
        let spec = valid_spec().with_account(AccountSpec::new("svc-a"));
        let issues = validate(&spec);
        assert!(issues.contains(&"duplicate account 'svc-a'".to_string()));
    }
}
