//! Desired-state specification for aws-orgs.
//!
//! This crate owns the organization spec document: its strongly-typed
//! schema, loading from YAML or JSON files, and the structural validation
//! that must pass before any reconciliation is attempted.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use loader::SpecLoader;
pub use schema::{AccountSpec, Effect, Ensure, OrgSpec, OuSpec, PolicySpec, ROOT_OU_NAME};
pub use validation::validate;
