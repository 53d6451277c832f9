//! Service control policy schema

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Ensure, null_as_empty};

/// Statement effect of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => write!(f, "Allow"),
            Effect::Deny => write!(f, "Deny"),
        }
    }
}

/// A service control policy definition
///
/// # Example YAML
///
/// ```yaml
/// Name: DenyRoot
/// Description: Deny actions by the root user
/// Effect: Deny
/// Actions:
///   - "*"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    /// Action patterns the statement applies to (e.g. `s3:*`)
    #[serde(rename = "Actions", default, deserialize_with = "null_as_empty")]
    pub actions: Vec<String>,
    #[serde(rename = "Ensure", default)]
    pub ensure: Ensure,
}

impl PolicySpec {
    pub fn new(name: impl Into<String>, effect: Effect, actions: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            effect,
            actions: actions.iter().map(|a| a.to_string()).collect(),
            ensure: Ensure::Present,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn absent(mut self) -> Self {
        self.ensure = Ensure::Absent;
        self
    }

    pub fn is_absent(&self) -> bool {
        self.ensure.is_absent()
    }
}
