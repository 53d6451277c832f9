//! Account schema

use serde::{Deserialize, Serialize};

use super::Ensure;

/// An account that should exist in the organization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSpec {
    #[serde(rename = "Name")]
    pub name: String,
    /// Root email; synthesized from `default_domain` when omitted
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Ensure", default)]
    pub ensure: Ensure,
}

impl AccountSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            ensure: Ensure::Present,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_absent(&self) -> bool {
        self.ensure.is_absent()
    }
}
