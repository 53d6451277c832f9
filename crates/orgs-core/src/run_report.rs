//! Outcome of a reconciliation run

use serde::Serialize;

use crate::options::ExecutionMode;
use crate::plan::Plan;
use crate::unmanaged::UnmanagedResources;

/// What a run decided, refused and found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub mode: ExecutionMode,
    /// Decisions in the order they were made
    pub actions: Vec<String>,
    /// Refused operations and failed account creations
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Resources live in the organization but absent from the spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmanaged: Option<UnmanagedResources>,
    /// Mutation calls actually sent to the service
    pub mutations_issued: usize,
}

impl RunReport {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Whether the run completed without refused operations
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the run decided on any change
    pub fn has_changes(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Number of mutation calls sent to the service
    pub fn mutations(&self) -> usize {
        self.mutations_issued
    }

    /// Record a plan's problems; its mutations are recorded as they execute
    pub fn absorb_findings(&mut self, plan: &Plan) {
        self.errors.extend(plan.errors.iter().cloned());
        self.warnings.extend(plan.warnings.iter().cloned());
    }

    pub fn with_action(mut self, action: String) -> Self {
        self.actions.push(action);
        self
    }
}
