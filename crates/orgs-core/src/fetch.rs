//! State Fetcher: read the live organization into an [`OrgSnapshot`]
//!
//! Every listing follows pagination cursors until the service reports no
//! more pages. Nothing here mutates the organization.

use std::collections::HashSet;

use crate::Result;
use crate::client::{CreateAccountState, OrgClient, Page};
use crate::model::{Account, OrgSnapshot, OuNode, Policy};

/// Name given to the root node of the live tree
pub const ROOT_NAME: &str = "root";

/// Collect every page of a listing into one vector.
pub fn collect_pages<T>(
    operation: &str,
    mut fetch_page: impl FnMut(Option<&str>) -> Result<Page<T>>,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = fetch_page(token.as_deref())?;
        items.extend(page.items);
        match page.next_token {
            Some(next) if !next.is_empty() => {
                tracing::debug!(operation, next_token = %next, "NextToken");
                token = Some(next);
            }
            _ => break,
        }
    }

    Ok(items)
}

/// Reads live state through an [`OrgClient`]
pub struct StateFetcher<'c, C: OrgClient + ?Sized> {
    client: &'c C,
}

impl<'c, C: OrgClient + ?Sized> StateFetcher<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    /// All accounts in the organization that have a name
    pub fn fetch_accounts(&self) -> Result<Vec<Account>> {
        let records = collect_pages("ListAccounts", |token| self.client.list_accounts(token))?;
        Ok(records
            .into_iter()
            .filter_map(|r| {
                let name = r.name?;
                Some(Account {
                    id: r.id,
                    name,
                    email: r.email.unwrap_or_default(),
                })
            })
            .collect())
    }

    /// All service control policies in the organization
    pub fn fetch_policies(&self) -> Result<Vec<Policy>> {
        let records = collect_pages("ListPolicies", |token| self.client.list_policies(token))?;
        Ok(records
            .into_iter()
            .map(|r| Policy {
                id: r.id,
                name: r.name,
                description: r.description,
            })
            .collect())
    }

    /// Recursively build the OU tree below `root_id`
    pub fn fetch_ou_tree(&self, root_id: &str) -> Result<OuNode> {
        self.fetch_ou(root_id, ROOT_NAME, None)
    }

    fn fetch_ou(&self, id: &str, name: &str, parent_id: Option<&str>) -> Result<OuNode> {
        let child_records = collect_pages("ListOrganizationalUnitsForParent", |token| {
            self.client.list_organizational_units_for_parent(id, token)
        })?;
        let mut accounts: Vec<String> = collect_pages("ListAccountsForParent", |token| {
            self.client.list_accounts_for_parent(id, token)
        })?
        .into_iter()
        .filter_map(|a| a.name)
        .collect();
        accounts.sort();
        let mut policies: Vec<String> = self
            .attached_policies(id)?
            .into_iter()
            .map(|p| p.name)
            .collect();
        policies.sort();

        let mut children = Vec::with_capacity(child_records.len());
        for child in child_records {
            children.push(self.fetch_ou(&child.id, &child.name, Some(id))?);
        }

        Ok(OuNode {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(String::from),
            accounts,
            policies,
            children,
        })
    }

    /// Policies directly attached to a root, OU or account
    pub fn attached_policies(&self, target_id: &str) -> Result<Vec<Policy>> {
        let records = collect_pages("ListPoliciesForTarget", |token| {
            self.client.list_policies_for_target(target_id, token)
        })?;
        Ok(records
            .into_iter()
            .map(|r| Policy {
                id: r.id,
                name: r.name,
                description: r.description,
            })
            .collect())
    }

    /// Ids of everything a policy is attached to
    pub fn policy_targets(&self, policy_id: &str) -> Result<Vec<String>> {
        collect_pages("ListTargetsForPolicy", |token| {
            self.client.list_targets_for_policy(policy_id, token)
        })
    }

    /// Raw JSON document of a policy
    pub fn policy_content(&self, policy_id: &str) -> Result<String> {
        self.client.describe_policy_content(policy_id)
    }

    /// Names of accounts whose creation has succeeded
    ///
    /// A name in this set that is missing from [`Self::fetch_accounts`] is
    /// an account the service has created but not yet made available.
    pub fn created_account_names(&self) -> Result<HashSet<String>> {
        let statuses = collect_pages("ListCreateAccountStatus", |token| {
            self.client
                .list_create_account_status(CreateAccountState::Succeeded, token)
        })?;
        Ok(statuses.into_iter().map(|s| s.account_name).collect())
    }

    /// Fetch accounts, policies and the OU tree in one go
    pub fn fetch_snapshot(&self) -> Result<OrgSnapshot> {
        tracing::debug!("Fetching organization snapshot");
        let root_id = self.client.root_id()?;
        let policies = self.fetch_policies()?;
        let accounts = self.fetch_accounts()?;
        let tree = self.fetch_ou_tree(&root_id)?;
        Ok(OrgSnapshot {
            root_id,
            accounts,
            policies,
            tree,
        })
    }
}
