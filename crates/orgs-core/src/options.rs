//! Run options: execution mode and account-creation polling

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether mutations are issued or only logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Compute and log decisions without touching the organization.
    #[default]
    Plan,
    /// Issue every decided mutation.
    Apply,
}

impl ExecutionMode {
    pub fn is_apply(self) -> bool {
        self == ExecutionMode::Apply
    }
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plan" | "dry-run" | "dryrun" => Ok(ExecutionMode::Plan),
            "apply" | "exec" => Ok(ExecutionMode::Apply),
            _ => Err(Error::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Plan => write!(f, "plan"),
            ExecutionMode::Apply => write!(f, "apply"),
        }
    }
}

/// Bounded polling of account-creation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Sleep between status checks
    pub interval: Duration,
    /// Maximum number of status checks
    pub attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            attempts: 5,
        }
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub mode: ExecutionMode,
    pub poll: PollConfig,
}

impl EngineOptions {
    /// Options for a dry run
    pub fn plan() -> Self {
        Self::default()
    }

    /// Options for a run that issues mutations
    pub fn apply() -> Self {
        Self {
            mode: ExecutionMode::Apply,
            ..Self::default()
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}
