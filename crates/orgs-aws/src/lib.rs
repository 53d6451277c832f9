//! AWS Organizations backend for aws-orgs.
//!
//! [`AwsOrgClient`] implements [`orgs_core::OrgClient`] on top of the
//! official `aws-sdk-organizations` crate. The engine is synchronous, so the
//! client owns a current-thread tokio runtime and blocks on every call.

mod client;
mod convert;

pub use client::AwsOrgClient;
