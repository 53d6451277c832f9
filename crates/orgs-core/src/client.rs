//! Remote organization service abstraction
//!
//! The reconciler never talks to the service directly. Everything it needs
//! is expressed by [`OrgClient`], so the same engine runs against AWS
//! Organizations or an in-memory organization in tests.

use std::fmt;

use crate::Result;

/// Policy the service attaches to every OU it creates
pub const SERVICE_BASELINE_POLICY: &str = "FullAWSAccess";

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page; `None` when the listing is exhausted
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A final page
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// A page followed by more results
    pub fn with_next(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }
}

/// Account as listed by the service
///
/// The name can be missing while an account is still being provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Organizational unit as listed by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuRecord {
    pub id: String,
    pub name: String,
}

/// Service control policy summary as listed by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// State of an asynchronous account-creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateAccountState {
    InProgress,
    Succeeded,
    Failed,
}

impl fmt::Display for CreateAccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateAccountState::InProgress => write!(f, "IN_PROGRESS"),
            CreateAccountState::Succeeded => write!(f, "SUCCEEDED"),
            CreateAccountState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Status of an account-creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountStatus {
    pub request_id: String,
    pub account_name: String,
    pub state: CreateAccountState,
    pub account_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// Blocking client for the remote organization service.
///
/// Listing methods return a single page; callers follow `next_token`.
/// Every error is reported as [`crate::Error::Client`].
pub trait OrgClient {
    /// Id of the organization root
    fn root_id(&self) -> Result<String>;

    /// Id of the organization's master account
    fn master_account_id(&self) -> Result<String>;

    /// Whether service control policies are enabled on the root
    fn policy_type_enabled(&self, root_id: &str) -> Result<bool>;

    /// Enable service control policies on the root
    fn enable_policy_type(&self, root_id: &str) -> Result<()>;

    fn list_accounts(&self, next_token: Option<&str>) -> Result<Page<AccountRecord>>;

    fn list_create_account_status(
        &self,
        state: CreateAccountState,
        next_token: Option<&str>,
    ) -> Result<Page<CreateAccountStatus>>;

    fn list_policies(&self, next_token: Option<&str>) -> Result<Page<PolicyRecord>>;

    /// Raw JSON document of a policy
    fn describe_policy_content(&self, policy_id: &str) -> Result<String>;

    fn list_organizational_units_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<OuRecord>>;

    fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<AccountRecord>>;

    fn list_policies_for_target(
        &self,
        target_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<PolicyRecord>>;

    /// Ids of the roots, OUs and accounts a policy is attached to
    fn list_targets_for_policy(
        &self,
        policy_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<String>>;

    /// Create an OU and return its id
    fn create_organizational_unit(&self, parent_id: &str, name: &str) -> Result<String>;

    fn delete_organizational_unit(&self, ou_id: &str) -> Result<()>;

    fn move_account(
        &self,
        account_id: &str,
        source_parent_id: &str,
        destination_parent_id: &str,
    ) -> Result<()>;

    fn attach_policy(&self, policy_id: &str, target_id: &str) -> Result<()>;

    fn detach_policy(&self, policy_id: &str, target_id: &str) -> Result<()>;

    /// Create a service control policy and return its id
    fn create_policy(&self, name: &str, description: &str, content: &str) -> Result<String>;

    fn update_policy(&self, policy_id: &str, description: &str, content: &str) -> Result<()>;

    fn delete_policy(&self, policy_id: &str) -> Result<()>;

    /// Start creating an account and return the creation request id
    fn create_account(&self, name: &str, email: &str) -> Result<String>;

    fn describe_create_account_status(&self, request_id: &str) -> Result<CreateAccountStatus>;
}
