//! Reconciliation engine for aws-orgs
//!
//! This crate compares a desired organization spec with the live
//! organization and converges the two, implementing:
//!
//! - **State fetching**: paginated reads into an immutable [`OrgSnapshot`]
//! - **Reconciliation**: policy and OU tree diffing into an ordered [`Plan`]
//! - **Execution**: mode-gated mutations with bounded account-creation polling
//! - **Unmanaged detection**: live resources the spec never names
//!
//! # Architecture
//!
//! ```text
//!                  orgs-cli
//!                     |
//!                 orgs-core  ---- OrgClient ----+-------------+
//!                     |                         |             |
//!                 orgs-spec                 orgs-aws   orgs-test-utils
//! ```
//!
//! A run flows through the engine as:
//!
//! ```text
//! spec + snapshot -> reconcile_policies -> re-fetch policies -> reconcile
//!   -> Executor -> re-fetch tree -> detect_unmanaged -> Executor
//! ```
//!
//! # Example
//!
//! ```ignore
//! use orgs_core::{EngineOptions, OrgEngine};
//!
//! let engine = OrgEngine::new(&client, EngineOptions::plan());
//! let report = engine.organization(&spec)?;
//! println!("{} changes", report.actions.len());
//! ```

pub mod accounts;
pub mod client;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod model;
pub mod options;
pub mod plan;
pub mod policy_doc;
pub mod reconcile;
pub mod report;
pub mod run_report;
pub mod unmanaged;

pub use client::{
    AccountRecord, CreateAccountState, CreateAccountStatus, OrgClient, OuRecord, Page,
    PolicyRecord, SERVICE_BASELINE_POLICY,
};
pub use engine::OrgEngine;
pub use error::{AccountConflict, Error, Result};
pub use executor::{AccountCreation, Executor};
pub use fetch::{StateFetcher, collect_pages};
pub use model::{Account, OrgSnapshot, OuNode, Policy};
pub use options::{EngineOptions, ExecutionMode, PollConfig};
pub use plan::{Mutation, OuRef, Plan};
pub use policy_doc::{PolicyDocument, documents_equal};
pub use reconcile::{ManagedSet, ReconcileContext, reconcile, reconcile_policies};
pub use report::OrgReport;
pub use run_report::RunReport;
pub use unmanaged::{UnmanagedResources, detect_unmanaged};
