//! Mutation Executor
//!
//! Owns every side effect of a run. Each method logs what it is about to do
//! and only calls the client in [`ExecutionMode::Apply`]; in plan mode the
//! decision has already been logged by the reconciler and nothing is sent.

use std::collections::HashMap;
use std::thread;

use crate::client::{CreateAccountState, OrgClient};
use crate::error::{Error, Result};
use crate::model::Policy;
use crate::options::{EngineOptions, ExecutionMode, PollConfig};
use crate::plan::{Mutation, OuRef, Plan};
use crate::run_report::RunReport;

/// Terminal result of an account-creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCreation {
    /// Plan mode; nothing was requested
    Skipped,
    Succeeded { account_id: Option<String> },
    Failed(String),
    /// Still in progress after the last poll
    StillPending,
}

/// Issues mutations against an [`OrgClient`]
pub struct Executor<'c, C: OrgClient + ?Sized> {
    client: &'c C,
    mode: ExecutionMode,
    poll: PollConfig,
    /// Ids of OUs created during this run, keyed by plan path
    created_ous: HashMap<String, String>,
    /// Policy ids keyed by name
    policy_ids: HashMap<String, String>,
    issued: usize,
}

impl<'c, C: OrgClient + ?Sized> Executor<'c, C> {
    pub fn new(client: &'c C, options: &EngineOptions) -> Self {
        Self {
            client,
            mode: options.mode,
            poll: options.poll,
            created_ous: HashMap::new(),
            policy_ids: HashMap::new(),
            issued: 0,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Number of mutation calls sent so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Replace the known policy ids, e.g. after re-fetching policies
    pub fn set_policies(&mut self, policies: &[Policy]) {
        self.policy_ids = policies
            .iter()
            .map(|p| (p.name.clone(), p.id.clone()))
            .collect();
    }

    /// Returns true when the call should go out; logs the skip otherwise
    fn gate(&self, what: &str) -> bool {
        if self.mode.is_apply() {
            true
        } else {
            tracing::debug!("[dry-run] Would {}", what);
            false
        }
    }

    fn resolve(&self, ou: &OuRef) -> Result<String> {
        match ou {
            OuRef::Existing(id) => Ok(id.clone()),
            OuRef::Planned(path) => self
                .created_ous
                .get(path)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("OU '{}' was not created", path))),
        }
    }

    fn policy_id(&self, name: &str) -> Result<String> {
        self.policy_ids
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("policy '{}'", name)))
    }

    pub fn create_ou(&mut self, parent: &OuRef, name: &str, path: &str) -> Result<()> {
        if !self.gate(&format!("create OU '{}' under {}", name, parent)) {
            return Ok(());
        }
        let parent_id = self.resolve(parent)?;
        let id = self.client.create_organizational_unit(&parent_id, name)?;
        self.issued += 1;
        tracing::debug!("Created OU '{}' with id {}", name, id);
        self.created_ous.insert(path.to_string(), id);
        Ok(())
    }

    pub fn delete_ou(&mut self, id: &str, name: &str) -> Result<()> {
        if !self.gate(&format!("delete OU '{}'", name)) {
            return Ok(());
        }
        self.client.delete_organizational_unit(id)?;
        self.issued += 1;
        Ok(())
    }

    pub fn move_account(
        &mut self,
        account_id: &str,
        source: &str,
        destination: &OuRef,
    ) -> Result<()> {
        if !self.gate(&format!("move account {} to {}", account_id, destination)) {
            return Ok(());
        }
        let destination = self.resolve(destination)?;
        self.client.move_account(account_id, source, &destination)?;
        self.issued += 1;
        Ok(())
    }

    pub fn attach_policy(&mut self, policy: &str, target: &OuRef) -> Result<()> {
        if !self.gate(&format!("attach policy '{}' to {}", policy, target)) {
            return Ok(());
        }
        let policy_id = self.policy_id(policy)?;
        let target = self.resolve(target)?;
        self.client.attach_policy(&policy_id, &target)?;
        self.issued += 1;
        Ok(())
    }

    pub fn detach_policy(&mut self, policy: &str, target: &OuRef) -> Result<()> {
        if !self.gate(&format!("detach policy '{}' from {}", policy, target)) {
            return Ok(());
        }
        let policy_id = self.policy_id(policy)?;
        let target = self.resolve(target)?;
        self.client.detach_policy(&policy_id, &target)?;
        self.issued += 1;
        Ok(())
    }

    pub fn create_policy(&mut self, name: &str, description: &str, content: &str) -> Result<()> {
        if !self.gate(&format!("create policy '{}'", name)) {
            return Ok(());
        }
        let id = self.client.create_policy(name, description, content)?;
        self.issued += 1;
        self.policy_ids.insert(name.to_string(), id);
        Ok(())
    }

    pub fn update_policy(&mut self, id: &str, description: &str, content: &str) -> Result<()> {
        if !self.gate(&format!("update policy {}", id)) {
            return Ok(());
        }
        self.client.update_policy(id, description, content)?;
        self.issued += 1;
        Ok(())
    }

    pub fn delete_policy(&mut self, id: &str, name: &str) -> Result<()> {
        if !self.gate(&format!("delete policy '{}'", name)) {
            return Ok(());
        }
        self.client.delete_policy(id)?;
        self.issued += 1;
        self.policy_ids.remove(name);
        Ok(())
    }

    /// Enable service control policies on the organization root
    pub fn enable_policy_type(&mut self, root_id: &str) -> Result<()> {
        tracing::info!("Enabling service control policies on root {}", root_id);
        if !self.gate("enable policy type SERVICE_CONTROL_POLICY") {
            return Ok(());
        }
        self.client.enable_policy_type(root_id)?;
        self.issued += 1;
        Ok(())
    }

    /// Request a new account and poll its status a bounded number of times.
    pub fn create_account(&mut self, name: &str, email: &str) -> Result<AccountCreation> {
        tracing::debug!("account email: {}", email);
        if !self.gate(&format!("create account '{}'", name)) {
            return Ok(AccountCreation::Skipped);
        }

        let request_id = self.client.create_account(name, email)?;
        self.issued += 1;
        tracing::info!("CreateAccountStatus Id: {}", request_id);

        for attempt in 1..=self.poll.attempts {
            let status = self.client.describe_create_account_status(&request_id)?;
            match status.state {
                CreateAccountState::Succeeded => {
                    tracing::info!("Account creation succeeded for '{}'", name);
                    return Ok(AccountCreation::Succeeded {
                        account_id: status.account_id,
                    });
                }
                CreateAccountState::Failed => {
                    let reason = status
                        .failure_reason
                        .unwrap_or_else(|| "unknown reason".to_string());
                    tracing::error!("Account creation failed: {}", reason);
                    return Ok(AccountCreation::Failed(reason));
                }
                CreateAccountState::InProgress => {
                    tracing::info!("Account creation in progress for '{}'", name);
                    if attempt < self.poll.attempts {
                        thread::sleep(self.poll.interval);
                    }
                }
            }
        }

        tracing::warn!("Account creation still pending. Moving on!");
        Ok(AccountCreation::StillPending)
    }

    /// Execute a single mutation.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<()> {
        match mutation {
            Mutation::CreateOu {
                parent, name, path, ..
            } => self.create_ou(parent, name, path),
            Mutation::DeleteOu { id, name } => self.delete_ou(id, name),
            Mutation::MoveAccount {
                account_id,
                source,
                destination,
                ..
            } => self.move_account(account_id, source, destination),
            Mutation::AttachPolicy { policy, target, .. } => self.attach_policy(policy, target),
            Mutation::DetachPolicy { policy, target, .. } => self.detach_policy(policy, target),
            Mutation::CreatePolicy {
                name,
                description,
                content,
            } => self.create_policy(name, description, content),
            Mutation::UpdatePolicy {
                id,
                description,
                content,
                ..
            } => self.update_policy(id, description, content),
            Mutation::DeletePolicy { id, name } => self.delete_policy(id, name),
            Mutation::CreateAccount { name, email } => {
                self.create_account(name, email).map(|_| ())
            }
        }
    }

    /// Execute a plan in order, recording decisions and outcomes.
    ///
    /// A client error stops execution and propagates.
    pub fn execute(&mut self, plan: &Plan, report: &mut RunReport) -> Result<()> {
        report.absorb_findings(plan);

        for mutation in &plan.mutations {
            let action = if self.mode.is_apply() {
                mutation.to_string()
            } else {
                format!("[dry-run] {}", mutation)
            };
            report.actions.push(action);

            match mutation {
                Mutation::CreateAccount { name, email } => {
                    match self.create_account(name, email)? {
                        AccountCreation::Failed(reason) => report
                            .errors
                            .push(format!("Account creation failed for '{}': {}", name, reason)),
                        AccountCreation::StillPending => report
                            .warnings
                            .push(format!("Account creation still pending for '{}'", name)),
                        AccountCreation::Skipped | AccountCreation::Succeeded { .. } => {}
                    }
                }
                other => self.apply(other)?,
            }
        }

        report.mutations_issued = self.issued;
        Ok(())
    }
}
