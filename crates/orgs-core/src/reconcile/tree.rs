//! Recursive OU tree differ
//!
//! Walks the desired OU tree alongside the live snapshot and emits an ordered
//! [`Plan`]. Existing nodes are handled children-first so an absent parent is
//! only deleted once its stale children are gone; new nodes are created
//! before their children since those need the new id as parent.

use std::collections::{BTreeSet, HashMap, HashSet};

use orgs_spec::{OrgSpec, OuSpec};

use crate::client::SERVICE_BASELINE_POLICY;
use crate::error::{Error, Result};
use crate::model::{OrgSnapshot, OuNode};
use crate::plan::{Mutation, OuRef, Plan};
use crate::reconcile::ManagedSet;

/// Everything the tree differ needs besides the spec tree itself
#[derive(Debug, Clone)]
pub struct ReconcileContext<'a> {
    pub snapshot: &'a OrgSnapshot,
    pub default_policy: String,
    /// Policy the service attaches to every OU it creates
    pub inherited_policy: String,
    /// Policies an OU may carry: present spec policies plus the default
    pub attachable_policies: BTreeSet<String>,
    /// How many spec nodes carry each OU name
    pub spec_ou_names: HashMap<String, usize>,
}

impl<'a> ReconcileContext<'a> {
    pub fn new(snapshot: &'a OrgSnapshot, spec: &OrgSpec) -> Self {
        let mut spec_ou_names = HashMap::new();
        for root in &spec.organizational_units {
            root.walk(&mut |ou| *spec_ou_names.entry(ou.name.clone()).or_insert(0) += 1);
        }
        Self {
            snapshot,
            default_policy: spec.default_policy.clone(),
            inherited_policy: SERVICE_BASELINE_POLICY.to_string(),
            attachable_policies: ManagedSet::attachable_policies(spec),
            spec_ou_names,
        }
    }

    /// Policies a deletion or detach never has to clear
    fn is_baseline(&self, policy: &str) -> bool {
        policy == self.default_policy || policy == self.inherited_policy
    }
}

/// Compute the OU mutations needed to converge the live tree to `spec_root`.
///
/// Refused deletions and accounts that are not yet in the organization are
/// recorded in the plan; attaching a policy the spec does not define is
/// fatal.
pub fn reconcile(spec_root: &OuSpec, ctx: &ReconcileContext<'_>) -> Result<Plan> {
    if !spec_root.is_root() {
        return Err(Error::MissingRoot);
    }

    let mut differ = TreeDiffer {
        ctx,
        plan: Plan::new(),
        moved_out: HashSet::new(),
        deleted: HashSet::new(),
        claimed: HashSet::new(),
    };
    let root = &ctx.snapshot.tree;
    differ.claimed.insert(root.id.clone());
    differ.visit_existing(spec_root, root, spec_root.name.as_str())?;
    Ok(differ.plan)
}

/// Where a spec node lives or will live
struct Parent<'n> {
    target: OuRef,
    name: String,
    path: String,
    /// `None` when the parent is itself created by this plan
    live: Option<&'n OuNode>,
}

struct TreeDiffer<'c, 'a> {
    ctx: &'c ReconcileContext<'a>,
    plan: Plan,
    /// Accounts with a planned move, keyed by name
    moved_out: HashSet<String>,
    /// Ids of OUs with a planned delete
    deleted: HashSet<String>,
    /// Ids of live OUs already matched to a spec node
    claimed: HashSet<String>,
}

impl<'c, 'a> TreeDiffer<'c, 'a> {
    fn visit_children(&mut self, spec: &OuSpec, parent: Parent<'a>) -> Result<()> {
        for child in &spec.child_ou {
            match self.resolve(child, &parent) {
                Some(live) => {
                    let path = format!("{}/{}", parent.path, child.name);
                    self.visit_existing(child, live, &path)?;
                }
                None => self.visit_missing(child, &parent)?,
            }
        }
        Ok(())
    }

    /// Find the live OU for a spec node: among the parent's live children,
    /// then by a name that is unique across both the spec and the live tree.
    /// A live OU is matched to at most one spec node.
    fn resolve(&mut self, spec: &OuSpec, parent: &Parent<'a>) -> Option<&'a OuNode> {
        let found = self.lookup(spec, parent)?;
        if !self.claimed.insert(found.id.clone()) {
            tracing::debug!("OU '{}' ({}) is already claimed", spec.name, found.id);
            return None;
        }
        Some(found)
    }

    fn lookup(&self, spec: &OuSpec, parent: &Parent<'a>) -> Option<&'a OuNode> {
        let live_parent = parent.live?;
        if let Some(found) = live_parent.child(&spec.name) {
            return Some(found);
        }
        if self.ctx.spec_ou_names.get(&spec.name).copied().unwrap_or(0) > 1 {
            return None;
        }

        match self.ctx.snapshot.find_ous_by_name(&spec.name).as_slice() {
            [found] if !found.is_root() => {
                tracing::debug!(
                    "OU '{}' found under '{}' rather than '{}'",
                    spec.name,
                    found.parent_id.as_deref().unwrap_or_default(),
                    parent.name
                );
                Some(*found)
            }
            _ => None,
        }
    }

    fn visit_existing(&mut self, spec: &OuSpec, live: &'a OuNode, path: &str) -> Result<()> {
        self.visit_children(
            spec,
            Parent {
                target: OuRef::Existing(live.id.clone()),
                name: live.name.clone(),
                path: path.to_string(),
                live: Some(live),
            },
        )?;

        if spec.is_absent() {
            self.delete_if_empty(spec, live);
            return Ok(());
        }

        let target = OuRef::Existing(live.id.clone());
        self.policy_delta(spec, &live.policies, &target)?;
        self.account_moves(spec, &target);
        Ok(())
    }

    fn visit_missing(&mut self, spec: &OuSpec, parent: &Parent<'a>) -> Result<()> {
        if spec.is_absent() {
            tracing::debug!("OU '{}' is absent and does not exist", spec.name);
            return Ok(());
        }

        let path = format!("{}/{}", parent.path, spec.name);
        self.plan.push(Mutation::CreateOu {
            parent: parent.target.clone(),
            parent_name: parent.name.clone(),
            name: spec.name.clone(),
            path: path.clone(),
        });

        let target = OuRef::Planned(path.clone());
        let inherited = [self.ctx.inherited_policy.clone()];
        self.policy_delta(spec, &inherited, &target)?;
        self.account_moves(spec, &target);

        self.visit_children(
            spec,
            Parent {
                target,
                name: spec.name.clone(),
                path,
                live: None,
            },
        )
    }

    fn delete_if_empty(&mut self, spec: &OuSpec, live: &OuNode) {
        let mut blockers = Vec::new();

        let accounts: Vec<&str> = live
            .accounts
            .iter()
            .filter(|a| !self.moved_out.contains(a.as_str()))
            .map(String::as_str)
            .collect();
        if !accounts.is_empty() {
            blockers.push(format!("Accounts ({})", accounts.join(", ")));
        }

        let children: Vec<&str> = live
            .children
            .iter()
            .filter(|c| !self.deleted.contains(&c.id))
            .map(|c| c.name.as_str())
            .collect();
        if !children.is_empty() {
            blockers.push(format!("Child_OU ({})", children.join(", ")));
        }

        let policies: Vec<&str> = live
            .policies
            .iter()
            .filter(|p| !self.ctx.is_baseline(p))
            .map(String::as_str)
            .collect();
        if !policies.is_empty() {
            blockers.push(format!("SC_Policies ({})", policies.join(", ")));
        }

        if blockers.is_empty() {
            self.deleted.insert(live.id.clone());
            self.plan.push(Mutation::DeleteOu {
                id: live.id.clone(),
                name: spec.name.clone(),
            });
        } else {
            self.plan.error(format!(
                "Can not delete OU '{}'. deployed {} exists.",
                spec.name,
                blockers.join(", ")
            ));
        }
    }

    fn policy_delta(&mut self, spec: &OuSpec, attached: &[String], target: &OuRef) -> Result<()> {
        let ctx = self.ctx;
        let default = ctx.default_policy.as_str();

        // A new OU only carries what the service attached on creation
        let mut wanted: Vec<&String> = spec.sc_policies.iter().collect();
        if matches!(target, OuRef::Planned(_))
            && !spec.sc_policies.contains(&ctx.default_policy)
        {
            wanted.push(&ctx.default_policy);
        }

        for policy in wanted.into_iter().filter(|p| !attached.contains(*p)) {
            if !ctx.attachable_policies.contains(policy) {
                return Err(Error::UndefinedPolicy {
                    ou: spec.name.clone(),
                    policy: policy.clone(),
                });
            }
            self.plan.push(Mutation::AttachPolicy {
                policy: policy.clone(),
                target: target.clone(),
                ou_name: spec.name.clone(),
            });
        }

        for policy in attached
            .iter()
            .filter(|p| p.as_str() != default && !spec.sc_policies.contains(*p))
        {
            self.plan.push(Mutation::DetachPolicy {
                policy: policy.clone(),
                target: target.clone(),
                ou_name: spec.name.clone(),
            });
        }

        Ok(())
    }

    fn account_moves(&mut self, spec: &OuSpec, destination: &OuRef) {
        let snapshot = self.ctx.snapshot;
        for name in &spec.accounts {
            let Some(account) = snapshot.account(name) else {
                self.plan
                    .warn(format!("Account '{}' not yet in Organization", name));
                continue;
            };
            let Some(source) = snapshot.parent_of_account(name) else {
                self.plan
                    .error(format!("Can not locate parent OU of account '{}'", name));
                continue;
            };
            if matches!(destination, OuRef::Existing(id) if id == source) {
                continue;
            }

            self.moved_out.insert(name.clone());
            self.plan.push(Mutation::MoveAccount {
                account: name.clone(),
                account_id: account.id.clone(),
                source: source.to_string(),
                destination: destination.clone(),
                ou_name: spec.name.clone(),
            });
        }
    }
}
