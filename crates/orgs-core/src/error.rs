//! Error types for orgs-core

use std::fmt;

/// Result type for orgs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// An account declared under more than one OU in the spec tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConflict {
    pub account: String,
    pub ous: Vec<String>,
}

impl fmt::Display for AccountConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "account '{}' set in multiple OUs: {}",
            self.account,
            self.ous.join(", ")
        )
    }
}

fn join_conflicts(conflicts: &[AccountConflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur in orgs-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A call to the remote organization service failed
    #[error("{operation} failed: {message}")]
    Client { operation: String, message: String },

    /// Accounts are assigned to more than one OU in the spec
    #[error("Invalid org spec: {}", join_conflicts(.conflicts))]
    AccountsNotUnique { conflicts: Vec<AccountConflict> },

    /// An OU references a policy the spec does not define
    #[error("spec-file: OU '{ou}' references undefined policy '{policy}'")]
    UndefinedPolicy { ou: String, policy: String },

    /// An OU references a policy the spec marks absent
    #[error("spec-file: OU '{ou}' references policy '{policy}' which is marked absent")]
    AbsentPolicyReference { ou: String, policy: String },

    /// The spec was written for a different organization
    #[error("Master account id mismatch: spec declares {expected}, organization reports {actual}")]
    MasterAccountMismatch { expected: String, actual: String },

    /// The spec has no `root` OU
    #[error("Spec has no root OU")]
    MissingRoot,

    /// Invalid execution mode string
    #[error("Invalid execution mode: {mode}")]
    InvalidMode { mode: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Spec loading or validation error from orgs-spec
    #[error(transparent)]
    Spec(#[from] orgs_spec::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a client error for the named remote operation
    pub fn client(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
