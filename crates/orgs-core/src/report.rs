//! Human-readable report of the live organization

use serde::Serialize;

use crate::client::OrgClient;
use crate::error::Result;
use crate::fetch::StateFetcher;
use crate::model::{Account, OuNode};
use crate::policy_doc::pretty;

const INDENT: &str = "  ";
const ACCOUNT_NAME_WIDTH: usize = 24;

/// A deployed policy with its decoded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub content: String,
}

/// Current state of the organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgReport {
    pub tree: OuNode,
    pub policies: Vec<PolicyDetail>,
    pub accounts: Vec<Account>,
}

impl OrgReport {
    /// Read the OU tree, every policy document and every account
    pub fn collect<C: OrgClient + ?Sized>(fetcher: &StateFetcher<'_, C>) -> Result<Self> {
        let snapshot = fetcher.fetch_snapshot()?;
        let mut policies = Vec::with_capacity(snapshot.policies.len());
        for policy in &snapshot.policies {
            policies.push(PolicyDetail {
                id: policy.id.clone(),
                name: policy.name.clone(),
                description: policy.description.clone(),
                content: fetcher.policy_content(&policy.id)?,
            });
        }
        Ok(Self {
            tree: snapshot.tree,
            policies,
            accounts: snapshot.accounts,
        })
    }

    /// All three sections, each under an underlined header
    pub fn render(&self) -> String {
        [
            section(
                "Provisioned Organizational Units in Org:",
                &render_ou_tree(&self.tree),
            ),
            section(
                "Provisioned Service Control Policies:",
                &render_policies(&self.policies),
            ),
            section("Provisioned Accounts in Org:", &render_accounts(&self.accounts)),
        ]
        .join("\n\n")
    }
}

fn section(header: &str, body: &str) -> String {
    format!("{}\n{}\n{}", "_".repeat(header.len()), header, body)
}

/// Render the OU tree, two spaces per level
pub fn render_ou_tree(root: &OuNode) -> String {
    let mut lines = Vec::new();
    render_ou(root, 0, &mut lines);
    lines.join("\n")
}

fn render_ou(ou: &OuNode, depth: usize, lines: &mut Vec<String>) {
    let pad = INDENT.repeat(depth);
    lines.push(format!("{}{}:", pad, ou.name));
    if !ou.policies.is_empty() {
        lines.push(format!("{}{}Policies: {}", pad, INDENT, ou.policies.join(", ")));
    }
    if !ou.accounts.is_empty() {
        let mut accounts = ou.accounts.clone();
        accounts.sort();
        lines.push(format!("{}{}Accounts: {}", pad, INDENT, accounts.join(", ")));
    }
    if !ou.children.is_empty() {
        lines.push(format!("{}{}Child_OU:", pad, INDENT));
        for child in &ou.children {
            render_ou(child, depth + 2, lines);
        }
    }
}

pub fn render_policies(policies: &[PolicyDetail]) -> String {
    policies
        .iter()
        .map(|p| {
            format!(
                "Name:\t\t{}\nDescription:\t{}\nId:\t{}\nContent:\n{}",
                p.name,
                p.description,
                p.id,
                pretty(&p.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One line per account sorted by name: name padded to 24 columns, id, email
pub fn render_accounts(accounts: &[Account]) -> String {
    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
        .iter()
        .map(|a| {
            format!(
                "{:<width$}{}\t\t{}",
                a.name,
                a.id,
                a.email,
                width = ACCOUNT_NAME_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
