//! Organization lifecycle driven by spec files
//!
//! Each test loads YAML (or JSON) from disk exactly as the CLI would, then
//! runs the engine against the in-memory organization across several runs.

use std::time::Duration;

use orgs_core::{EngineOptions, Error, OrgEngine, PollConfig, RunReport};
use orgs_spec::{OrgSpec, SpecLoader};
use orgs_test_utils::{Call, FakeOrganization, TestSpecFile};
use pretty_assertions::assert_eq;
use rstest::rstest;

const HEADER: &str = r#"master_account_id: "111111111111"
default_domain: example.com
default_ou: root
default_policy: FullAWSAccess
accounts:
  - Name: master
  - Name: svc-a
  - Name: svc-b
sc_policies:
  - Name: DenyRoot
    Description: Deny root user
    Effect: Deny
    Actions: ["*"]
  - Name: DenyLeaveOrg
    Description: Deny leaving the organization
    Effect: Deny
    Actions: ["organizations:LeaveOrganization"]
"#;

const DEPLOYED_TREE: &str = r#"organizational_units:
  - Name: root
    Accounts: [master]
    SC_Policies: [FullAWSAccess]
    Child_OU:
      - Name: Engineering
        Accounts: [svc-a]
        SC_Policies: [DenyRoot]
        Child_OU:
          - Name: Platform
            Accounts: [svc-b]
            SC_Policies: [DenyRoot, DenyLeaveOrg]
      - Name: Sandbox
"#;

/// Platform emptied out but still declared
const EMPTIED_TREE: &str = r#"organizational_units:
  - Name: root
    Accounts: [master]
    Child_OU:
      - Name: Engineering
        Accounts: [svc-a, svc-b]
        SC_Policies: [DenyRoot]
        Child_OU:
          - Name: Platform
      - Name: Sandbox
"#;

const RETIRED_TREE: &str = r#"organizational_units:
  - Name: root
    Accounts: [master]
    Child_OU:
      - Name: Engineering
        Accounts: [svc-a, svc-b]
        SC_Policies: [DenyRoot]
        Child_OU:
          - Name: Platform
            Ensure: absent
      - Name: Sandbox
"#;

fn load(contents: &str) -> OrgSpec {
    let file = TestSpecFile::yaml(contents);
    SpecLoader::new()
        .load(file.path())
        .unwrap_or_else(|e| panic!("spec should load: {}", e))
}

fn spec_with_tree(tree: &str) -> OrgSpec {
    load(&format!("{}{}", HEADER, tree))
}

fn apply() -> EngineOptions {
    EngineOptions::apply().with_poll(PollConfig {
        interval: Duration::ZERO,
        attempts: 3,
    })
}

fn run(org: &FakeOrganization, spec: &OrgSpec) -> RunReport {
    OrgEngine::new(org, apply())
        .organization(spec)
        .unwrap_or_else(|e| panic!("run should succeed: {}", e))
}

/// A fresh organization with both service accounts sitting in root
fn fresh_org() -> FakeOrganization {
    let org = FakeOrganization::new();
    org.add_account("svc-a", "root");
    org.add_account("svc-b", "root");
    org
}

/// An organization already converged to `DEPLOYED_TREE`
fn deployed_org() -> FakeOrganization {
    let org = fresh_org();
    run(&org, &spec_with_tree(DEPLOYED_TREE));
    org.clear_mutations();
    org
}

mod deploy_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_run_builds_tree() {
        let org = fresh_org();

        let report = run(&org, &spec_with_tree(DEPLOYED_TREE));

        assert!(report.success(), "errors: {:?}", report.errors);
        assert_eq!(org.parent_ou_of("Engineering").as_deref(), Some("root"));
        assert_eq!(org.parent_ou_of("Platform").as_deref(), Some("Engineering"));
        assert_eq!(org.parent_ou_of("Sandbox").as_deref(), Some("root"));
        assert_eq!(org.parent_of("svc-a").as_deref(), Some("Engineering"));
        assert_eq!(org.parent_of("svc-b").as_deref(), Some("Platform"));
        assert_eq!(
            org.policies_on("Platform"),
            vec!["DenyLeaveOrg", "DenyRoot", "FullAWSAccess"]
        );
        assert_eq!(org.policies_on("Sandbox"), vec!["FullAWSAccess"]);
    }

    #[test]
    fn test_policies_created_before_any_ou() {
        let org = fresh_org();

        run(&org, &spec_with_tree(DEPLOYED_TREE));

        let calls = org.mutations();
        let first_ou = calls
            .iter()
            .position(|c| matches!(c, Call::CreateOu { .. }))
            .expect("an OU is created");
        let created_policies = calls[..first_ou]
            .iter()
            .filter(|c| matches!(c, Call::CreatePolicy { .. }))
            .count();
        assert_eq!(created_policies, 2);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let org = deployed_org();

        let report = run(&org, &spec_with_tree(DEPLOYED_TREE));

        assert!(org.mutations().is_empty(), "{:?}", org.mutations());
        assert_eq!(report.mutations(), 0);
        assert!(!report.has_changes());
    }

    #[test]
    fn test_json_spec_deploys_same_tree() {
        let yaml = spec_with_tree(DEPLOYED_TREE);
        let json = serde_json::to_string(&yaml).unwrap();
        let file = TestSpecFile::named("org.json", &json);
        let spec = SpecLoader::new().load(file.path()).unwrap();
        assert_eq!(spec, yaml);

        let org = fresh_org();
        run(&org, &spec);

        assert_eq!(org.parent_of("svc-b").as_deref(), Some("Platform"));
    }

    #[test]
    fn test_dry_run_decides_what_apply_does() {
        let spec = spec_with_tree(DEPLOYED_TREE);

        let planned_org = fresh_org();
        let planned = OrgEngine::new(&planned_org, EngineOptions::plan())
            .organization(&spec)
            .unwrap();
        let applied = run(&fresh_org(), &spec);

        assert!(planned_org.mutations().is_empty());
        let stripped: Vec<&str> = planned
            .actions
            .iter()
            .map(|a| a.strip_prefix("[dry-run] ").unwrap_or(a))
            .collect();
        assert_eq!(stripped, applied.actions);
        assert_eq!(planned.errors, applied.errors);
    }
}

mod teardown_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_occupied_ou_survives_absent_marker() {
        let org = deployed_org();

        // svc-b is no longer listed anywhere, so it lands in root as unmanaged
        let tree = RETIRED_TREE.replace("[svc-a, svc-b]", "[svc-a]");
        let report = run(&org, &spec_with_tree(&tree));

        assert!(org.has_ou("Platform"));
        assert!(!org.mutations().iter().any(|c| matches!(c, Call::DeleteOu { .. })));
        assert!(!report.success());
        assert!(
            report.errors[0].starts_with("Can not delete OU 'Platform'"),
            "{:?}",
            report.errors
        );
        assert_eq!(
            report.unmanaged.as_ref().map(|u| u.accounts.clone()),
            Some(vec!["svc-b".to_string()])
        );
        assert_eq!(org.parent_of("svc-b").as_deref(), Some("root"));
    }

    #[test]
    fn test_emptied_then_retired() {
        let org = deployed_org();

        let emptied = run(&org, &spec_with_tree(EMPTIED_TREE));
        assert!(emptied.success(), "errors: {:?}", emptied.errors);
        assert_eq!(org.parent_of("svc-b").as_deref(), Some("Engineering"));
        assert_eq!(org.policies_on("Platform"), vec!["FullAWSAccess"]);

        org.clear_mutations();
        let retired = run(&org, &spec_with_tree(RETIRED_TREE));
        assert!(retired.success(), "errors: {:?}", retired.errors);
        assert!(!org.has_ou("Platform"));
        assert_eq!(org.mutations().len(), 1);

        org.clear_mutations();
        run(&org, &spec_with_tree(RETIRED_TREE));
        assert!(org.mutations().is_empty(), "{:?}", org.mutations());
    }

    #[test]
    fn test_retired_policy_is_deleted_once_detached() {
        let org = deployed_org();
        run(&org, &spec_with_tree(EMPTIED_TREE));

        let retired = HEADER.replace(
            "Actions: [\"organizations:LeaveOrganization\"]",
            "Actions: [\"organizations:LeaveOrganization\"]\n    Ensure: absent",
        );
        org.clear_mutations();
        let report = run(&org, &load(&format!("{}{}", retired, EMPTIED_TREE)));

        assert!(report.success(), "errors: {:?}", report.errors);
        assert!(!org.has_policy("DenyLeaveOrg"));
        assert!(org.has_policy("DenyRoot"));
    }
}

mod validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::sibling_ous(
        "      - Name: Sandbox\n        Accounts: [svc-a]\n",
        vec!["Engineering", "Sandbox"]
    )]
    #[case::nested_ou(
        "      - Name: Sandbox\n        Child_OU:\n          - Name: Scratch\n            Accounts: [svc-a]\n",
        vec!["Engineering", "Scratch"]
    )]
    fn test_double_placement_aborts(#[case] sandbox: &str, #[case] expected: Vec<&str>) {
        let org = fresh_org();
        let tree = DEPLOYED_TREE.replace("      - Name: Sandbox\n", sandbox);

        let err = OrgEngine::new(&org, apply())
            .organization(&spec_with_tree(&tree))
            .unwrap_err();

        match err {
            Error::AccountsNotUnique { conflicts } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].account, "svc-a");
                let mut ous = conflicts[0].ous.clone();
                ous.sort();
                assert_eq!(ous, expected);
            }
            other => panic!("expected AccountsNotUnique, got {:?}", other),
        }
        assert!(org.mutations().is_empty());
    }

    #[test]
    fn test_foreign_organization_rejected() {
        let org = fresh_org();
        let spec = load(
            &format!("{}{}", HEADER, DEPLOYED_TREE)
                .replace("111111111111", "222222222222"),
        );

        let err = OrgEngine::new(&org, apply()).organization(&spec).unwrap_err();

        assert!(matches!(err, Error::MasterAccountMismatch { .. }));
        assert!(org.mutations().is_empty());
    }
}

mod account_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_created_accounts_then_placed() {
        let org = FakeOrganization::new();
        let spec = spec_with_tree(DEPLOYED_TREE);

        let created = OrgEngine::new(&org, apply()).accounts(&spec).unwrap();
        assert!(created.success(), "errors: {:?}", created.errors);
        assert_eq!(
            org.mutations(),
            vec![
                Call::CreateAccount {
                    name: "svc-a".into(),
                    email: "svc-a@example.com".into(),
                },
                Call::CreateAccount {
                    name: "svc-b".into(),
                    email: "svc-b@example.com".into(),
                },
            ]
        );

        run(&org, &spec);
        assert_eq!(org.parent_of("svc-a").as_deref(), Some("Engineering"));
        assert_eq!(org.parent_of("svc-b").as_deref(), Some("Platform"));

        org.clear_mutations();
        OrgEngine::new(&org, apply()).accounts(&spec).unwrap();
        assert!(org.mutations().is_empty());
    }
}
