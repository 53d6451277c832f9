//! Reconciliation of the desired spec against a live snapshot
//!
//! - **validate**: configuration checks that abort a run before any mutation
//! - **managed**: the set of names the spec declares
//! - **policies**: create/update/delete of service control policies
//! - **tree**: the recursive OU tree differ

mod managed;
mod policies;
mod tree;
mod validate;

pub use managed::ManagedSet;
pub use policies::reconcile_policies;
pub use tree::{ReconcileContext, reconcile};
pub use validate::{
    validate_accounts_unique, validate_master_account, validate_policy_references,
};
