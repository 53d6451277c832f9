//! Shared test utilities for the aws-orgs workspace.
//!
//! This crate provides fixtures shared by the crate test suites. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fake`]: [`FakeOrganization`], an in-memory [`orgs_core::OrgClient`]
//! - [`spec_file`]: [`TestSpecFile`], spec documents written to a temp dir

pub mod fake;
pub mod spec_file;

pub use fake::{Call, CreationOutcome, DEFAULT_POLICY, FakeOrganization, MASTER_ACCOUNT_ID, ROOT_ID};
pub use spec_file::TestSpecFile;
