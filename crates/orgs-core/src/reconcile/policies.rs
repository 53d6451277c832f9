//! Service control policy reconciliation
//!
//! Runs once per run, before the OU tree is walked, so attachments can rely
//! on every spec policy existing with the right content.

use similar::{ChangeTag, TextDiff};

use orgs_spec::OrgSpec;

use crate::client::OrgClient;
use crate::error::Result;
use crate::fetch::StateFetcher;
use crate::model::OrgSnapshot;
use crate::plan::{Mutation, Plan};
use crate::policy_doc::{PolicyDocument, documents_equal, pretty};

/// Plan policy creates, updates and deletes.
///
/// The default policy is never touched. A policy marked absent is only
/// deleted when nothing is attached to it.
pub fn reconcile_policies<C: OrgClient + ?Sized>(
    spec: &OrgSpec,
    snapshot: &OrgSnapshot,
    fetcher: &StateFetcher<'_, C>,
) -> Result<Plan> {
    let mut plan = Plan::new();

    for policy_spec in &spec.sc_policies {
        tracing::debug!("considering sc_policy: {}", policy_spec.name);
        if policy_spec.name == spec.default_policy {
            continue;
        }
        let live = snapshot.policy(&policy_spec.name);

        if policy_spec.is_absent() {
            let Some(live) = live else {
                continue;
            };
            if fetcher.policy_targets(&live.id)?.is_empty() {
                plan.push(Mutation::DeletePolicy {
                    id: live.id.clone(),
                    name: live.name.clone(),
                });
            } else {
                plan.error(format!(
                    "Cannot delete policy '{}'. Still attached to OU",
                    live.name
                ));
            }
            continue;
        }

        let content = PolicyDocument::from_spec(policy_spec).render();
        tracing::debug!("spec sc_policy_doc: {}", content);

        match live {
            None => plan.push(Mutation::CreatePolicy {
                name: policy_spec.name.clone(),
                description: policy_spec.description.clone(),
                content,
            }),
            Some(live) => {
                let deployed = fetcher.policy_content(&live.id)?;
                tracing::debug!("real sc_policy_doc: {}", deployed);

                let same_document = documents_equal(&deployed, &content);
                if !same_document {
                    log_document_diff(&policy_spec.name, &deployed, &content);
                }
                if policy_spec.description != live.description || !same_document {
                    plan.push(Mutation::UpdatePolicy {
                        id: live.id.clone(),
                        name: live.name.clone(),
                        description: policy_spec.description.clone(),
                        content,
                    });
                }
            }
        }
    }

    Ok(plan)
}

fn log_document_diff(name: &str, deployed: &str, desired: &str) {
    let deployed = pretty(deployed);
    let desired = pretty(desired);
    let diff = TextDiff::from_lines(&deployed, &desired);

    let mut lines = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        lines.push(sign);
        lines.push_str(change.value());
        if change.missing_newline() {
            lines.push('\n');
        }
    }
    tracing::debug!("policy '{}' document changes:\n{}", name, lines);
}
