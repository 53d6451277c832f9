//! Mutation intents produced by the reconciler
//!
//! A [`Plan`] is an ordered list of [`Mutation`]s plus the precondition
//! errors and warnings found while computing it. Order is significant: an
//! OU is created before anything targets it, and children are handled
//! before their parent is deleted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to an OU that either exists now or is created earlier in the plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OuRef {
    /// Live OU (or root) id
    Existing(String),
    /// Path of an OU created by a preceding `CreateOu`, e.g. `root/Engineering`
    Planned(String),
}

impl fmt::Display for OuRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OuRef::Existing(id) => write!(f, "{}", id),
            OuRef::Planned(path) => write!(f, "<new:{}>", path),
        }
    }
}

/// A single change to the organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    CreateOu {
        parent: OuRef,
        parent_name: String,
        name: String,
        /// Key under which the new OU id is recorded
        path: String,
    },
    DeleteOu {
        id: String,
        name: String,
    },
    MoveAccount {
        account: String,
        account_id: String,
        source: String,
        destination: OuRef,
        ou_name: String,
    },
    AttachPolicy {
        policy: String,
        target: OuRef,
        ou_name: String,
    },
    DetachPolicy {
        policy: String,
        target: OuRef,
        ou_name: String,
    },
    CreatePolicy {
        name: String,
        description: String,
        content: String,
    },
    UpdatePolicy {
        id: String,
        name: String,
        description: String,
        content: String,
    },
    DeletePolicy {
        id: String,
        name: String,
    },
    CreateAccount {
        name: String,
        email: String,
    },
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreateOu {
                name, parent_name, ..
            } => write!(f, "Creating new OU '{}' under parent '{}'", name, parent_name),
            Mutation::DeleteOu { name, .. } => write!(f, "Deleting OU '{}'", name),
            Mutation::MoveAccount {
                account, ou_name, ..
            } => write!(f, "Moving account '{}' to OU '{}'", account, ou_name),
            Mutation::AttachPolicy {
                policy, ou_name, ..
            } => write!(f, "Attaching policy '{}' to OU '{}'", policy, ou_name),
            Mutation::DetachPolicy {
                policy, ou_name, ..
            } => write!(f, "Detaching policy '{}' from OU '{}'", policy, ou_name),
            Mutation::CreatePolicy { name, .. } => write!(f, "Creating policy '{}'", name),
            Mutation::UpdatePolicy { name, .. } => write!(f, "Updating policy '{}'", name),
            Mutation::DeletePolicy { name, .. } => write!(f, "Deleting policy '{}'", name),
            Mutation::CreateAccount { name, .. } => write!(f, "Creating account '{}'", name),
        }
    }
}

/// Ordered mutations plus the problems found while planning them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub mutations: Vec<Mutation>,
    /// Refused operations (e.g. deleting a non-empty OU)
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a decision and queue the mutation
    pub fn push(&mut self, mutation: Mutation) {
        tracing::info!("{}", mutation);
        self.mutations.push(mutation);
    }

    /// Log and record a refused operation
    pub fn error(&mut self, message: String) {
        tracing::error!("{}", message);
        self.errors.push(message);
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Append another plan after this one
    pub fn extend(&mut self, other: Plan) {
        self.mutations.extend(other.mutations);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
