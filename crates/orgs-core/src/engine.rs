//! Run engine: wires fetching, reconciliation and execution together

use orgs_spec::OrgSpec;

use crate::accounts::{plan_account_creation, unlisted_accounts};
use crate::client::OrgClient;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::fetch::StateFetcher;
use crate::model::Account;
use crate::options::EngineOptions;
use crate::reconcile::{
    ManagedSet, ReconcileContext, reconcile, reconcile_policies, validate_accounts_unique,
    validate_master_account, validate_policy_references,
};
use crate::report::OrgReport;
use crate::run_report::RunReport;
use crate::unmanaged::{UnmanagedResources, detect_unmanaged, plan_unmanaged_placement};

/// Reconciles an organization through an [`OrgClient`]
///
/// The engine provides three operations:
/// - **report**: read-only view of OUs, policies and accounts
/// - **organization**: converge OUs, policies and placements to a spec
/// - **accounts**: create spec accounts missing from the organization
pub struct OrgEngine<'c, C: OrgClient + ?Sized> {
    client: &'c C,
    options: EngineOptions,
}

impl<'c, C: OrgClient + ?Sized> OrgEngine<'c, C> {
    pub fn new(client: &'c C, options: EngineOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn fetcher(&self) -> StateFetcher<'c, C> {
        StateFetcher::new(self.client)
    }

    fn check_master_account(&self, spec: &OrgSpec) -> Result<()> {
        let actual = self.client.master_account_id()?;
        validate_master_account(spec, &actual)
    }

    /// Current OU tree, policies and accounts. No spec is involved, so the
    /// unmanaged-resource pass does not run.
    pub fn report(&self) -> Result<OrgReport> {
        OrgReport::collect(&self.fetcher())
    }

    /// Every account in the organization
    pub fn account_report(&self) -> Result<Vec<Account>> {
        self.fetcher().fetch_accounts()
    }

    /// Converge OUs, policies and account placement to `spec`.
    ///
    /// Configuration errors abort before any mutation. Refused operations
    /// are recorded in the returned report and the run carries on.
    pub fn organization(&self, spec: &OrgSpec) -> Result<RunReport> {
        let root_spec = spec.root().ok_or(Error::MissingRoot)?;
        self.check_master_account(spec)?;
        validate_accounts_unique(root_spec)?;
        validate_policy_references(spec)?;

        let mode = self.options.mode;
        let fetcher = self.fetcher();
        let mut report = RunReport::new(mode);
        let mut executor = Executor::new(self.client, &self.options);

        let mut snapshot = fetcher.fetch_snapshot()?;
        executor.set_policies(&snapshot.policies);

        if !self.client.policy_type_enabled(&snapshot.root_id)? {
            report
                .actions
                .push("Enabling service control policies on root".to_string());
            executor.enable_policy_type(&snapshot.root_id)?;
        }

        let policy_plan = reconcile_policies(spec, &snapshot, &fetcher)?;
        executor.execute(&policy_plan, &mut report)?;
        if mode.is_apply() && !policy_plan.is_empty() {
            snapshot.policies = fetcher.fetch_policies()?;
            executor.set_policies(&snapshot.policies);
        }

        let ctx = ReconcileContext::new(&snapshot, spec);
        let ou_plan = reconcile(root_spec, &ctx)?;
        executor.execute(&ou_plan, &mut report)?;

        if mode.is_apply() && !ou_plan.is_empty() {
            snapshot = fetcher.fetch_snapshot()?;
        }
        let managed = ManagedSet::from_spec(spec);
        let unmanaged = detect_unmanaged(&snapshot, &managed);
        let placement = plan_unmanaged_placement(&unmanaged, &snapshot, &spec.default_ou);
        executor.execute(&placement, &mut report)?;
        report.unmanaged = Some(unmanaged);

        tracing::info!(
            mode = %mode,
            actions = report.actions.len(),
            errors = report.errors.len(),
            issued = report.mutations_issued,
            "Organization run complete"
        );
        Ok(report)
    }

    /// Create spec accounts missing from the organization and report live
    /// accounts the spec does not list.
    pub fn accounts(&self, spec: &OrgSpec) -> Result<RunReport> {
        self.check_master_account(spec)?;

        let fetcher = self.fetcher();
        let mut report = RunReport::new(self.options.mode);
        let mut executor = Executor::new(self.client, &self.options);

        let accounts = fetcher.fetch_accounts()?;
        let created = fetcher.created_account_names()?;
        let plan = plan_account_creation(spec, &accounts, &created);
        executor.execute(&plan, &mut report)?;

        let unlisted = unlisted_accounts(spec, &accounts);
        if !unlisted.is_empty() {
            tracing::warn!("Unmanaged accounts in Org: {}", unlisted.join(", "));
        }
        report.unmanaged = Some(UnmanagedResources {
            accounts: unlisted,
            ..UnmanagedResources::default()
        });
        Ok(report)
    }
}
