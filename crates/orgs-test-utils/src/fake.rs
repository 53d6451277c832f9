//! [`FakeOrganization`]: an in-memory organization behind [`OrgClient`].
//!
//! Behaves like the real service where the engine cares: listings are
//! paginated, new OUs get the default policy, non-empty OUs and attached
//! policies cannot be deleted, and moves must name the current parent.
//! Every mutation call is recorded in order.

use std::sync::{Mutex, MutexGuard};

use orgs_core::{
    AccountRecord, CreateAccountState, CreateAccountStatus, Error, OrgClient, OuRecord, Page,
    PolicyRecord, Result,
};

pub const ROOT_ID: &str = "r-root";
pub const MASTER_ACCOUNT_ID: &str = "111111111111";
pub const DEFAULT_POLICY: &str = orgs_core::SERVICE_BASELINE_POLICY;

const ROOT_NAME: &str = "root";
const DEFAULT_POLICY_ID: &str = "p-FullAWSAccess";
const DEFAULT_POLICY_CONTENT: &str =
    r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"*","Resource":"*"}]}"#;

/// A mutation call received by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    EnablePolicyType { root_id: String },
    CreateOu { parent_id: String, name: String },
    DeleteOu { id: String },
    MoveAccount { account_id: String, source: String, destination: String },
    AttachPolicy { policy_id: String, target_id: String },
    DetachPolicy { policy_id: String, target_id: String },
    CreatePolicy { name: String },
    UpdatePolicy { id: String },
    DeletePolicy { id: String },
    CreateAccount { name: String, email: String },
}

/// How account-creation requests progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    /// Report `IN_PROGRESS` this many times, then `SUCCEEDED`
    SucceedAfter(u32),
    Fail(String),
    /// `IN_PROGRESS` forever
    Pending,
}

struct FakeOu {
    id: String,
    name: String,
    parent: Option<String>,
}

struct FakeAccount {
    id: String,
    name: Option<String>,
    email: String,
    parent: String,
}

struct FakePolicy {
    id: String,
    name: String,
    description: String,
    content: String,
}

struct CreationRequest {
    status: CreateAccountStatus,
    email: String,
    polls: u32,
}

struct State {
    scp_enabled: bool,
    ous: Vec<FakeOu>,
    accounts: Vec<FakeAccount>,
    policies: Vec<FakePolicy>,
    /// (policy id, target id)
    attachments: Vec<(String, String)>,
    requests: Vec<CreationRequest>,
    creation: CreationOutcome,
    calls: Vec<Call>,
    /// Listing operations with the token they were called with
    reads: Vec<(String, Option<String>)>,
    fail_on: Option<String>,
    page_size: usize,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }

    fn ou_by_name(&self, name: &str) -> Option<&FakeOu> {
        self.ous.iter().find(|ou| ou.name == name)
    }

    fn ou_exists(&self, id: &str) -> bool {
        self.ous.iter().any(|ou| ou.id == id)
    }

    fn policy_by_name(&self, name: &str) -> Option<&FakePolicy> {
        self.policies.iter().find(|p| p.name == name)
    }

    fn policy_record(p: &FakePolicy) -> PolicyRecord {
        PolicyRecord {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
        }
    }

    fn account_record(a: &FakeAccount) -> AccountRecord {
        AccountRecord {
            id: a.id.clone(),
            name: a.name.clone(),
            email: Some(a.email.clone()),
        }
    }

    fn check_failure(&self, operation: &str) -> Result<()> {
        match &self.fail_on {
            Some(op) if op == operation => Err(Error::client(operation, "injected failure")),
            _ => Ok(()),
        }
    }

    fn page<T>(&mut self, operation: &str, items: Vec<T>, token: Option<&str>) -> Result<Page<T>> {
        self.check_failure(operation)?;
        self.reads
            .push((operation.to_string(), token.map(String::from)));

        let start = match token {
            None => 0,
            Some(t) => t.parse::<usize>().map_err(|_| {
                Error::client(operation, format!("InvalidInputException: bad token {}", t))
            })?,
        };
        let end = (start + self.page_size).min(items.len());
        let next = (end < items.len()).then(|| end.to_string());
        let items: Vec<T> = items.into_iter().skip(start).take(end.saturating_sub(start)).collect();
        Ok(Page {
            items,
            next_token: next,
        })
    }

    fn record(&mut self, operation: &str, call: Call) -> Result<()> {
        self.check_failure(operation)?;
        self.calls.push(call);
        Ok(())
    }
}

/// In-memory organization with a root, a master account and the default
/// policy attached to the root.
pub struct FakeOrganization {
    state: Mutex<State>,
}

impl Default for FakeOrganization {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeOrganization {
    pub fn new() -> Self {
        let state = State {
            scp_enabled: true,
            ous: vec![FakeOu {
                id: ROOT_ID.to_string(),
                name: ROOT_NAME.to_string(),
                parent: None,
            }],
            accounts: vec![FakeAccount {
                id: MASTER_ACCOUNT_ID.to_string(),
                name: Some("master".to_string()),
                email: "master@example.com".to_string(),
                parent: ROOT_ID.to_string(),
            }],
            policies: vec![FakePolicy {
                id: DEFAULT_POLICY_ID.to_string(),
                name: DEFAULT_POLICY.to_string(),
                description: "Allows access to every operation".to_string(),
                content: DEFAULT_POLICY_CONTENT.to_string(),
            }],
            attachments: vec![(DEFAULT_POLICY_ID.to_string(), ROOT_ID.to_string())],
            requests: Vec::new(),
            creation: CreationOutcome::SucceedAfter(0),
            calls: Vec::new(),
            reads: Vec::new(),
            fail_on: None,
            page_size: 2,
            next_id: 0,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake organization state poisoned")
    }

    // ---- setup ----

    /// Listing page size; small by default so pagination is always exercised
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state().page_size = page_size.max(1);
        self
    }

    pub fn with_scp_disabled(self) -> Self {
        self.state().scp_enabled = false;
        self
    }

    pub fn with_creation(self, outcome: CreationOutcome) -> Self {
        self.state().creation = outcome;
        self
    }

    /// Make every call to `operation` fail, e.g. `"MoveAccount"`
    pub fn fail_on(&self, operation: &str) {
        self.state().fail_on = Some(operation.to_string());
    }

    /// Add an OU under the OU named `parent` and attach the default policy
    pub fn add_ou(&self, parent: &str, name: &str) -> String {
        let mut state = self.state();
        let parent_id = state
            .ou_by_name(parent)
            .map(|ou| ou.id.clone())
            .unwrap_or_else(|| panic!("no OU named {}", parent));
        let id = state.next_id("ou");
        state.ous.push(FakeOu {
            id: id.clone(),
            name: name.to_string(),
            parent: Some(parent_id),
        });
        state
            .attachments
            .push((DEFAULT_POLICY_ID.to_string(), id.clone()));
        id
    }

    /// Add an account inside the OU named `ou`
    pub fn add_account(&self, name: &str, ou: &str) -> String {
        let mut state = self.state();
        let parent = state
            .ou_by_name(ou)
            .map(|o| o.id.clone())
            .unwrap_or_else(|| panic!("no OU named {}", ou));
        let id = format!("{:012}", 200_000_000_000u64 + state.accounts.len() as u64);
        state.accounts.push(FakeAccount {
            id: id.clone(),
            name: Some(name.to_string()),
            email: format!("{}@example.com", name),
            parent,
        });
        id
    }

    /// Add an account the service lists without a name
    pub fn add_nameless_account(&self) {
        let mut state = self.state();
        let id = format!("{:012}", 300_000_000_000u64 + state.accounts.len() as u64);
        state.accounts.push(FakeAccount {
            id,
            name: None,
            email: String::new(),
            parent: ROOT_ID.to_string(),
        });
    }

    /// Record a succeeded creation for an account that is not listed yet
    pub fn add_pending_account(&self, name: &str) {
        let mut state = self.state();
        let request_id = state.next_id("car");
        state.requests.push(CreationRequest {
            status: CreateAccountStatus {
                request_id,
                account_name: name.to_string(),
                state: CreateAccountState::Succeeded,
                account_id: None,
                failure_reason: None,
            },
            email: String::new(),
            polls: 0,
        });
    }

    pub fn add_policy(&self, name: &str, description: &str, content: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("p");
        state.policies.push(FakePolicy {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            content: content.to_string(),
        });
        id
    }

    /// Attach a policy to the OU named `ou`
    pub fn attach(&self, policy: &str, ou: &str) {
        let mut state = self.state();
        let policy_id = state
            .policy_by_name(policy)
            .map(|p| p.id.clone())
            .unwrap_or_else(|| panic!("no policy named {}", policy));
        let target = state
            .ou_by_name(ou)
            .map(|o| o.id.clone())
            .unwrap_or_else(|| panic!("no OU named {}", ou));
        state.attachments.push((policy_id, target));
    }

    // ---- inspection ----

    /// Mutation calls received so far, in order
    pub fn mutations(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_mutations(&self) {
        self.state().calls.clear();
    }

    /// Number of requests made to a listing operation
    pub fn reads_of(&self, operation: &str) -> usize {
        self.state()
            .reads
            .iter()
            .filter(|(op, _)| op == operation)
            .count()
    }

    /// Number of requests to a listing operation that carried a token
    pub fn continued_reads_of(&self, operation: &str) -> usize {
        self.state()
            .reads
            .iter()
            .filter(|(op, token)| op == operation && token.is_some())
            .count()
    }

    pub fn ou_id(&self, name: &str) -> Option<String> {
        self.state().ou_by_name(name).map(|ou| ou.id.clone())
    }

    pub fn has_ou(&self, name: &str) -> bool {
        self.ou_id(name).is_some()
    }

    /// Name of the OU directly containing an account
    pub fn parent_of(&self, account: &str) -> Option<String> {
        let state = self.state();
        let parent = state
            .accounts
            .iter()
            .find(|a| a.name.as_deref() == Some(account))?
            .parent
            .clone();
        state
            .ous
            .iter()
            .find(|ou| ou.id == parent)
            .map(|ou| ou.name.clone())
    }

    /// Name of the parent of the OU named `ou`
    pub fn parent_ou_of(&self, ou: &str) -> Option<String> {
        let state = self.state();
        let parent = state.ou_by_name(ou)?.parent.clone()?;
        state
            .ous
            .iter()
            .find(|o| o.id == parent)
            .map(|o| o.name.clone())
    }

    /// Names of policies attached to the OU named `ou`, sorted
    pub fn policies_on(&self, ou: &str) -> Vec<String> {
        let state = self.state();
        let Some(target) = state.ou_by_name(ou).map(|o| o.id.clone()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = state
            .attachments
            .iter()
            .filter(|(_, t)| *t == target)
            .filter_map(|(p, _)| state.policies.iter().find(|x| x.id == *p))
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn has_policy(&self, name: &str) -> bool {
        self.state().policy_by_name(name).is_some()
    }

    pub fn policy_id(&self, name: &str) -> Option<String> {
        self.state().policy_by_name(name).map(|p| p.id.clone())
    }

    /// Description and content of a policy
    pub fn policy(&self, name: &str) -> Option<(String, String)> {
        self.state()
            .policy_by_name(name)
            .map(|p| (p.description.clone(), p.content.clone()))
    }

    pub fn has_account(&self, name: &str) -> bool {
        self.state()
            .accounts
            .iter()
            .any(|a| a.name.as_deref() == Some(name))
    }

    pub fn scp_enabled(&self) -> bool {
        self.state().scp_enabled
    }
}

impl OrgClient for FakeOrganization {
    fn root_id(&self) -> Result<String> {
        self.state().check_failure("ListRoots")?;
        Ok(ROOT_ID.to_string())
    }

    fn master_account_id(&self) -> Result<String> {
        self.state().check_failure("DescribeOrganization")?;
        Ok(MASTER_ACCOUNT_ID.to_string())
    }

    fn policy_type_enabled(&self, _root_id: &str) -> Result<bool> {
        Ok(self.state().scp_enabled)
    }

    fn enable_policy_type(&self, root_id: &str) -> Result<()> {
        let mut state = self.state();
        if state.scp_enabled {
            return Err(Error::client(
                "EnablePolicyType",
                "PolicyTypeAlreadyEnabledException",
            ));
        }
        state.record(
            "EnablePolicyType",
            Call::EnablePolicyType {
                root_id: root_id.to_string(),
            },
        )?;
        state.scp_enabled = true;
        Ok(())
    }

    fn list_accounts(&self, next_token: Option<&str>) -> Result<Page<AccountRecord>> {
        let mut state = self.state();
        let items = state.accounts.iter().map(State::account_record).collect();
        state.page("ListAccounts", items, next_token)
    }

    fn list_create_account_status(
        &self,
        wanted: CreateAccountState,
        next_token: Option<&str>,
    ) -> Result<Page<CreateAccountStatus>> {
        let mut state = self.state();
        let items = state
            .requests
            .iter()
            .filter(|r| r.status.state == wanted)
            .map(|r| r.status.clone())
            .collect();
        state.page("ListCreateAccountStatus", items, next_token)
    }

    fn list_policies(&self, next_token: Option<&str>) -> Result<Page<PolicyRecord>> {
        let mut state = self.state();
        let items = state.policies.iter().map(State::policy_record).collect();
        state.page("ListPolicies", items, next_token)
    }

    fn describe_policy_content(&self, policy_id: &str) -> Result<String> {
        let state = self.state();
        state.check_failure("DescribePolicy")?;
        state
            .policies
            .iter()
            .find(|p| p.id == policy_id)
            .map(|p| p.content.clone())
            .ok_or_else(|| Error::client("DescribePolicy", "PolicyNotFoundException"))
    }

    fn list_organizational_units_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<OuRecord>> {
        let mut state = self.state();
        let items = state
            .ous
            .iter()
            .filter(|ou| ou.parent.as_deref() == Some(parent_id))
            .map(|ou| OuRecord {
                id: ou.id.clone(),
                name: ou.name.clone(),
            })
            .collect();
        state.page("ListOrganizationalUnitsForParent", items, next_token)
    }

    fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<AccountRecord>> {
        let mut state = self.state();
        let items = state
            .accounts
            .iter()
            .filter(|a| a.parent == parent_id)
            .map(State::account_record)
            .collect();
        state.page("ListAccountsForParent", items, next_token)
    }

    fn list_policies_for_target(
        &self,
        target_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<PolicyRecord>> {
        let mut state = self.state();
        let items = state
            .attachments
            .iter()
            .filter(|(_, t)| t == target_id)
            .filter_map(|(p, _)| state.policies.iter().find(|x| x.id == *p))
            .map(State::policy_record)
            .collect();
        state.page("ListPoliciesForTarget", items, next_token)
    }

    fn list_targets_for_policy(
        &self,
        policy_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<String>> {
        let mut state = self.state();
        let items = state
            .attachments
            .iter()
            .filter(|(p, _)| p == policy_id)
            .map(|(_, t)| t.clone())
            .collect();
        state.page("ListTargetsForPolicy", items, next_token)
    }

    fn create_organizational_unit(&self, parent_id: &str, name: &str) -> Result<String> {
        let mut state = self.state();
        if !state.ou_exists(parent_id) {
            return Err(Error::client(
                "CreateOrganizationalUnit",
                "ParentNotFoundException",
            ));
        }
        if state
            .ous
            .iter()
            .any(|ou| ou.parent.as_deref() == Some(parent_id) && ou.name == name)
        {
            return Err(Error::client(
                "CreateOrganizationalUnit",
                "DuplicateOrganizationalUnitException",
            ));
        }
        state.record(
            "CreateOrganizationalUnit",
            Call::CreateOu {
                parent_id: parent_id.to_string(),
                name: name.to_string(),
            },
        )?;
        let id = state.next_id("ou");
        state.ous.push(FakeOu {
            id: id.clone(),
            name: name.to_string(),
            parent: Some(parent_id.to_string()),
        });
        state
            .attachments
            .push((DEFAULT_POLICY_ID.to_string(), id.clone()));
        Ok(id)
    }

    fn delete_organizational_unit(&self, ou_id: &str) -> Result<()> {
        let mut state = self.state();
        if ou_id == ROOT_ID || !state.ou_exists(ou_id) {
            return Err(Error::client(
                "DeleteOrganizationalUnit",
                "OrganizationalUnitNotFoundException",
            ));
        }
        let has_children = state.ous.iter().any(|ou| ou.parent.as_deref() == Some(ou_id));
        let has_accounts = state.accounts.iter().any(|a| a.parent == ou_id);
        if has_children || has_accounts {
            return Err(Error::client(
                "DeleteOrganizationalUnit",
                "OrganizationalUnitNotEmptyException",
            ));
        }
        state.record(
            "DeleteOrganizationalUnit",
            Call::DeleteOu {
                id: ou_id.to_string(),
            },
        )?;
        state.ous.retain(|ou| ou.id != ou_id);
        state.attachments.retain(|(_, t)| t != ou_id);
        Ok(())
    }

    fn move_account(
        &self,
        account_id: &str,
        source_parent_id: &str,
        destination_parent_id: &str,
    ) -> Result<()> {
        let mut state = self.state();
        let Some(current) = state
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.parent.clone())
        else {
            return Err(Error::client("MoveAccount", "AccountNotFoundException"));
        };
        if current != source_parent_id {
            return Err(Error::client("MoveAccount", "SourceParentNotFoundException"));
        }
        if !state.ou_exists(destination_parent_id) {
            return Err(Error::client(
                "MoveAccount",
                "DestinationParentNotFoundException",
            ));
        }
        if current == destination_parent_id {
            return Err(Error::client("MoveAccount", "DuplicateAccountException"));
        }
        state.record(
            "MoveAccount",
            Call::MoveAccount {
                account_id: account_id.to_string(),
                source: source_parent_id.to_string(),
                destination: destination_parent_id.to_string(),
            },
        )?;
        if let Some(account) = state.accounts.iter_mut().find(|a| a.id == account_id) {
            account.parent = destination_parent_id.to_string();
        }
        Ok(())
    }

    fn attach_policy(&self, policy_id: &str, target_id: &str) -> Result<()> {
        let mut state = self.state();
        if !state.policies.iter().any(|p| p.id == policy_id) {
            return Err(Error::client("AttachPolicy", "PolicyNotFoundException"));
        }
        if !state.ou_exists(target_id) {
            return Err(Error::client("AttachPolicy", "TargetNotFoundException"));
        }
        if state
            .attachments
            .iter()
            .any(|(p, t)| p == policy_id && t == target_id)
        {
            return Err(Error::client(
                "AttachPolicy",
                "DuplicatePolicyAttachmentException",
            ));
        }
        state.record(
            "AttachPolicy",
            Call::AttachPolicy {
                policy_id: policy_id.to_string(),
                target_id: target_id.to_string(),
            },
        )?;
        state
            .attachments
            .push((policy_id.to_string(), target_id.to_string()));
        Ok(())
    }

    fn detach_policy(&self, policy_id: &str, target_id: &str) -> Result<()> {
        let mut state = self.state();
        let before = state.attachments.len();
        state
            .attachments
            .retain(|(p, t)| !(p == policy_id && t == target_id));
        if state.attachments.len() == before {
            return Err(Error::client("DetachPolicy", "PolicyNotAttachedException"));
        }
        state.record(
            "DetachPolicy",
            Call::DetachPolicy {
                policy_id: policy_id.to_string(),
                target_id: target_id.to_string(),
            },
        )
    }

    fn create_policy(&self, name: &str, description: &str, content: &str) -> Result<String> {
        let mut state = self.state();
        if state.policy_by_name(name).is_some() {
            return Err(Error::client("CreatePolicy", "DuplicatePolicyException"));
        }
        state.record(
            "CreatePolicy",
            Call::CreatePolicy {
                name: name.to_string(),
            },
        )?;
        let id = state.next_id("p");
        state.policies.push(FakePolicy {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            content: content.to_string(),
        });
        Ok(id)
    }

    fn update_policy(&self, policy_id: &str, description: &str, content: &str) -> Result<()> {
        let mut state = self.state();
        if !state.policies.iter().any(|p| p.id == policy_id) {
            return Err(Error::client("UpdatePolicy", "PolicyNotFoundException"));
        }
        state.record(
            "UpdatePolicy",
            Call::UpdatePolicy {
                id: policy_id.to_string(),
            },
        )?;
        if let Some(policy) = state.policies.iter_mut().find(|p| p.id == policy_id) {
            policy.description = description.to_string();
            policy.content = content.to_string();
        }
        Ok(())
    }

    fn delete_policy(&self, policy_id: &str) -> Result<()> {
        let mut state = self.state();
        if state.attachments.iter().any(|(p, _)| p == policy_id) {
            return Err(Error::client("DeletePolicy", "PolicyInUseException"));
        }
        if !state.policies.iter().any(|p| p.id == policy_id) {
            return Err(Error::client("DeletePolicy", "PolicyNotFoundException"));
        }
        state.record(
            "DeletePolicy",
            Call::DeletePolicy {
                id: policy_id.to_string(),
            },
        )?;
        state.policies.retain(|p| p.id != policy_id);
        Ok(())
    }

    fn create_account(&self, name: &str, email: &str) -> Result<String> {
        let mut state = self.state();
        state.record(
            "CreateAccount",
            Call::CreateAccount {
                name: name.to_string(),
                email: email.to_string(),
            },
        )?;
        let request_id = state.next_id("car");
        state.requests.push(CreationRequest {
            status: CreateAccountStatus {
                request_id: request_id.clone(),
                account_name: name.to_string(),
                state: CreateAccountState::InProgress,
                account_id: None,
                failure_reason: None,
            },
            email: email.to_string(),
            polls: 0,
        });
        Ok(request_id)
    }

    fn describe_create_account_status(&self, request_id: &str) -> Result<CreateAccountStatus> {
        let mut guard = self.state();
        let state = &mut *guard;
        let outcome = state.creation.clone();
        let new_id = format!("{:012}", 400_000_000_000u64 + state.accounts.len() as u64);

        let Some(request) = state
            .requests
            .iter_mut()
            .find(|r| r.status.request_id == request_id)
        else {
            return Err(Error::client(
                "DescribeCreateAccountStatus",
                "CreateAccountStatusNotFoundException",
            ));
        };

        if request.status.state == CreateAccountState::InProgress {
            request.polls += 1;
            match outcome {
                CreationOutcome::SucceedAfter(n) if request.polls > n => {
                    request.status.state = CreateAccountState::Succeeded;
                    request.status.account_id = Some(new_id.clone());
                    state.accounts.push(FakeAccount {
                        id: new_id,
                        name: Some(request.status.account_name.clone()),
                        email: request.email.clone(),
                        parent: ROOT_ID.to_string(),
                    });
                }
                CreationOutcome::Fail(reason) => {
                    request.status.state = CreateAccountState::Failed;
                    request.status.failure_reason = Some(reason);
                }
                _ => {}
            }
        }

        Ok(request.status.clone())
    }
}
