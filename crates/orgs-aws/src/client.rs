use std::future::Future;

use aws_config::BehaviorVersion;
use aws_sdk_organizations::Client;
use aws_sdk_organizations::error::DisplayErrorContext;
use aws_sdk_organizations::types::PolicyType;
use tokio::runtime::{Builder, Runtime};

use orgs_core::{
    AccountRecord, CreateAccountState, CreateAccountStatus, Error, OrgClient, OuRecord, Page,
    PolicyRecord, Result,
};

use crate::convert;

/// [`OrgClient`] backed by AWS Organizations
pub struct AwsOrgClient {
    runtime: Runtime,
    client: Client,
}

impl AwsOrgClient {
    /// Load credentials and region from the standard AWS provider chain.
    /// An explicit `region` overrides the chain's region.
    pub fn new(region: Option<String>) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::client("InitRuntime", e.to_string()))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = runtime.block_on(loader.load());
        let client = Client::new(&sdk_config);

        tracing::debug!(
            region = ?sdk_config.region().map(|r| r.to_string()),
            "AWS Organizations client initialized"
        );

        Ok(Self { runtime, client })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn sdk_error<E: std::error::Error>(operation: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::client(operation, DisplayErrorContext(&e).to_string())
}

fn required(value: Option<&str>, operation: &str, field: &str) -> Result<String> {
    value
        .map(String::from)
        .ok_or_else(|| Error::client(operation, format!("response has no {field}")))
}

fn page<T>(items: Vec<T>, next_token: Option<&str>) -> Page<T> {
    Page {
        items,
        next_token: next_token.map(String::from),
    }
}

impl OrgClient for AwsOrgClient {
    fn root_id(&self) -> Result<String> {
        let output = self
            .block_on(self.client.list_roots().send())
            .map_err(sdk_error("ListRoots"))?;
        let root = output
            .roots()
            .first()
            .ok_or_else(|| Error::client("ListRoots", "organization has no root"))?;
        required(root.id(), "ListRoots", "root id")
    }

    fn master_account_id(&self) -> Result<String> {
        let output = self
            .block_on(self.client.describe_organization().send())
            .map_err(sdk_error("DescribeOrganization"))?;
        required(
            output.organization().and_then(|o| o.master_account_id()),
            "DescribeOrganization",
            "master account id",
        )
    }

    fn policy_type_enabled(&self, root_id: &str) -> Result<bool> {
        let output = self
            .block_on(self.client.list_roots().send())
            .map_err(sdk_error("ListRoots"))?;
        Ok(output
            .roots()
            .iter()
            .filter(|r| r.id() == Some(root_id))
            .any(convert::scp_enabled))
    }

    fn enable_policy_type(&self, root_id: &str) -> Result<()> {
        self.block_on(
            self.client
                .enable_policy_type()
                .root_id(root_id)
                .policy_type(PolicyType::ServiceControlPolicy)
                .send(),
        )
        .map_err(sdk_error("EnablePolicyType"))?;
        Ok(())
    }

    fn list_accounts(&self, next_token: Option<&str>) -> Result<Page<AccountRecord>> {
        let output = self
            .block_on(
                self.client
                    .list_accounts()
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListAccounts"))?;
        let items = output
            .accounts()
            .iter()
            .filter_map(convert::account_record)
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn list_create_account_status(
        &self,
        state: CreateAccountState,
        next_token: Option<&str>,
    ) -> Result<Page<CreateAccountStatus>> {
        let output = self
            .block_on(
                self.client
                    .list_create_account_status()
                    .states(convert::sdk_state(state))
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListCreateAccountStatus"))?;
        let items = output
            .create_account_statuses()
            .iter()
            .map(convert::create_account_status)
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn list_policies(&self, next_token: Option<&str>) -> Result<Page<PolicyRecord>> {
        let output = self
            .block_on(
                self.client
                    .list_policies()
                    .filter(PolicyType::ServiceControlPolicy)
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListPolicies"))?;
        let items = output
            .policies()
            .iter()
            .filter_map(convert::policy_record)
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn describe_policy_content(&self, policy_id: &str) -> Result<String> {
        let output = self
            .block_on(self.client.describe_policy().policy_id(policy_id).send())
            .map_err(sdk_error("DescribePolicy"))?;
        required(
            output.policy().and_then(|p| p.content()),
            "DescribePolicy",
            "policy content",
        )
    }

    fn list_organizational_units_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<OuRecord>> {
        let output = self
            .block_on(
                self.client
                    .list_organizational_units_for_parent()
                    .parent_id(parent_id)
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListOrganizationalUnitsForParent"))?;
        let items = output
            .organizational_units()
            .iter()
            .filter_map(convert::ou_record)
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<AccountRecord>> {
        let output = self
            .block_on(
                self.client
                    .list_accounts_for_parent()
                    .parent_id(parent_id)
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListAccountsForParent"))?;
        let items = output
            .accounts()
            .iter()
            .filter_map(convert::account_record)
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn list_policies_for_target(
        &self,
        target_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<PolicyRecord>> {
        let output = self
            .block_on(
                self.client
                    .list_policies_for_target()
                    .target_id(target_id)
                    .filter(PolicyType::ServiceControlPolicy)
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListPoliciesForTarget"))?;
        let items = output
            .policies()
            .iter()
            .filter_map(convert::policy_record)
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn list_targets_for_policy(
        &self,
        policy_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<String>> {
        let output = self
            .block_on(
                self.client
                    .list_targets_for_policy()
                    .policy_id(policy_id)
                    .set_next_token(next_token.map(String::from))
                    .send(),
            )
            .map_err(sdk_error("ListTargetsForPolicy"))?;
        let items = output
            .targets()
            .iter()
            .filter_map(|t| t.target_id().map(String::from))
            .collect();
        Ok(page(items, output.next_token()))
    }

    fn create_organizational_unit(&self, parent_id: &str, name: &str) -> Result<String> {
        let output = self
            .block_on(
                self.client
                    .create_organizational_unit()
                    .parent_id(parent_id)
                    .name(name)
                    .send(),
            )
            .map_err(sdk_error("CreateOrganizationalUnit"))?;
        required(
            output.organizational_unit().and_then(|ou| ou.id()),
            "CreateOrganizationalUnit",
            "OU id",
        )
    }

    fn delete_organizational_unit(&self, ou_id: &str) -> Result<()> {
        self.block_on(
            self.client
                .delete_organizational_unit()
                .organizational_unit_id(ou_id)
                .send(),
        )
        .map_err(sdk_error("DeleteOrganizationalUnit"))?;
        Ok(())
    }

    fn move_account(
        &self,
        account_id: &str,
        source_parent_id: &str,
        destination_parent_id: &str,
    ) -> Result<()> {
        self.block_on(
            self.client
                .move_account()
                .account_id(account_id)
                .source_parent_id(source_parent_id)
                .destination_parent_id(destination_parent_id)
                .send(),
        )
        .map_err(sdk_error("MoveAccount"))?;
        Ok(())
    }

    fn attach_policy(&self, policy_id: &str, target_id: &str) -> Result<()> {
        self.block_on(
            self.client
                .attach_policy()
                .policy_id(policy_id)
                .target_id(target_id)
                .send(),
        )
        .map_err(sdk_error("AttachPolicy"))?;
        Ok(())
    }

    fn detach_policy(&self, policy_id: &str, target_id: &str) -> Result<()> {
        self.block_on(
            self.client
                .detach_policy()
                .policy_id(policy_id)
                .target_id(target_id)
                .send(),
        )
        .map_err(sdk_error("DetachPolicy"))?;
        Ok(())
    }

    fn create_policy(&self, name: &str, description: &str, content: &str) -> Result<String> {
        let output = self
            .block_on(
                self.client
                    .create_policy()
                    .name(name)
                    .description(description)
                    .content(content)
                    .r#type(PolicyType::ServiceControlPolicy)
                    .send(),
            )
            .map_err(sdk_error("CreatePolicy"))?;
        required(
            output
                .policy()
                .and_then(|p| p.policy_summary())
                .and_then(|s| s.id()),
            "CreatePolicy",
            "policy id",
        )
    }

    fn update_policy(&self, policy_id: &str, description: &str, content: &str) -> Result<()> {
        self.block_on(
            self.client
                .update_policy()
                .policy_id(policy_id)
                .description(description)
                .content(content)
                .send(),
        )
        .map_err(sdk_error("UpdatePolicy"))?;
        Ok(())
    }

    fn delete_policy(&self, policy_id: &str) -> Result<()> {
        self.block_on(self.client.delete_policy().policy_id(policy_id).send())
            .map_err(sdk_error("DeletePolicy"))?;
        Ok(())
    }

    fn create_account(&self, name: &str, email: &str) -> Result<String> {
        let output = self
            .block_on(
                self.client
                    .create_account()
                    .account_name(name)
                    .email(email)
                    .send(),
            )
            .map_err(sdk_error("CreateAccount"))?;
        required(
            output.create_account_status().and_then(|s| s.id()),
            "CreateAccount",
            "request id",
        )
    }

    fn describe_create_account_status(&self, request_id: &str) -> Result<CreateAccountStatus> {
        let output = self
            .block_on(
                self.client
                    .describe_create_account_status()
                    .create_account_request_id(request_id)
                    .send(),
            )
            .map_err(sdk_error("DescribeCreateAccountStatus"))?;
        output
            .create_account_status()
            .map(convert::create_account_status)
            .ok_or_else(|| {
                Error::client("DescribeCreateAccountStatus", "response has no status")
            })
    }
}
