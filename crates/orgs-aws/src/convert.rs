//! Conversions between SDK shapes and orgs-core records

use aws_sdk_organizations::types as sdk;

use orgs_core::{
    AccountRecord, CreateAccountState, CreateAccountStatus, OuRecord, PolicyRecord,
};

/// Accounts without an id are skipped
pub(crate) fn account_record(account: &sdk::Account) -> Option<AccountRecord> {
    Some(AccountRecord {
        id: account.id()?.to_string(),
        name: account.name().map(String::from),
        email: account.email().map(String::from),
    })
}

pub(crate) fn ou_record(ou: &sdk::OrganizationalUnit) -> Option<OuRecord> {
    Some(OuRecord {
        id: ou.id()?.to_string(),
        name: ou.name()?.to_string(),
    })
}

pub(crate) fn policy_record(policy: &sdk::PolicySummary) -> Option<PolicyRecord> {
    Some(PolicyRecord {
        id: policy.id()?.to_string(),
        name: policy.name()?.to_string(),
        description: policy.description().unwrap_or_default().to_string(),
    })
}

pub(crate) fn create_account_status(status: &sdk::CreateAccountStatus) -> CreateAccountStatus {
    let state = match status.state() {
        Some(sdk::CreateAccountState::Succeeded) => CreateAccountState::Succeeded,
        Some(sdk::CreateAccountState::Failed) => CreateAccountState::Failed,
        _ => CreateAccountState::InProgress,
    };
    CreateAccountStatus {
        request_id: status.id().unwrap_or_default().to_string(),
        account_name: status.account_name().unwrap_or_default().to_string(),
        state,
        account_id: status.account_id().map(String::from),
        failure_reason: status.failure_reason().map(|r| r.as_str().to_string()),
    }
}

pub(crate) fn sdk_state(state: CreateAccountState) -> sdk::CreateAccountState {
    match state {
        CreateAccountState::InProgress => sdk::CreateAccountState::InProgress,
        CreateAccountState::Succeeded => sdk::CreateAccountState::Succeeded,
        CreateAccountState::Failed => sdk::CreateAccountState::Failed,
    }
}

/// Whether service control policies are enabled on a root
pub(crate) fn scp_enabled(root: &sdk::Root) -> bool {
    root.policy_types().iter().any(|p| {
        p.r#type() == Some(&sdk::PolicyType::ServiceControlPolicy)
            && p.status() == Some(&sdk::PolicyTypeStatus::Enabled)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_account_without_name_keeps_id() {
        let account = sdk::Account::builder().id("222222222222").build();
        let record = account_record(&account).unwrap();
        assert_eq!(record.id, "222222222222");
        assert_eq!(record.name, None);
    }

    #[test]
    fn test_account_without_id_is_skipped() {
        let account = sdk::Account::builder().name("ghost").build();
        assert!(account_record(&account).is_none());
    }

    #[test]
    fn test_policy_without_description() {
        let policy = sdk::PolicySummary::builder()
            .id("p-1")
            .name("DenyRoot")
            .build();
        assert_eq!(
            policy_record(&policy).unwrap(),
            PolicyRecord {
                id: "p-1".into(),
                name: "DenyRoot".into(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn test_failed_status_keeps_reason() {
        let status = sdk::CreateAccountStatus::builder()
            .id("car-1")
            .account_name("svc")
            .state(sdk::CreateAccountState::Failed)
            .failure_reason(sdk::CreateAccountFailureReason::EmailAlreadyExists)
            .build();
        let converted = create_account_status(&status);
        assert_eq!(converted.state, CreateAccountState::Failed);
        assert_eq!(converted.failure_reason.as_deref(), Some("EMAIL_ALREADY_EXISTS"));
    }

    #[rstest]
    #[case(CreateAccountState::InProgress)]
    #[case(CreateAccountState::Succeeded)]
    #[case(CreateAccountState::Failed)]
    fn test_state_names_match_service(#[case] state: CreateAccountState) {
        assert_eq!(sdk_state(state).as_str(), state.to_string());
    }

    #[test]
    fn test_scp_enabled_on_root() {
        let enabled = sdk::Root::builder()
            .id("r-1")
            .policy_types(
                sdk::PolicyTypeSummary::builder()
                    .r#type(sdk::PolicyType::ServiceControlPolicy)
                    .status(sdk::PolicyTypeStatus::Enabled)
                    .build(),
            )
            .build();
        let bare = sdk::Root::builder().id("r-1").build();
        assert!(scp_enabled(&enabled));
        assert!(!scp_enabled(&bare));
    }
}
