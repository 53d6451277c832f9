//! Schema definitions for the organization spec document
//!
//! The document is a single YAML (or JSON) file:
//!
//! - top-level settings: `master_account_id`, `default_domain`,
//!   `default_ou`, `default_policy`
//! - `accounts` - account definitions (name and optional email)
//! - `sc_policies` - service control policy definitions
//! - `organizational_units` - the OU tree, rooted at a node named `root`

pub mod account;
pub mod organization;
pub mod ou;
pub mod policy;

pub use account::AccountSpec;
pub use organization::OrgSpec;
pub use ou::{OuSpec, ROOT_OU_NAME};
pub use policy::{Effect, PolicySpec};

use serde::{Deserialize, Deserializer, Serialize};

/// Whether a declared resource should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// Resource should exist (the default when `Ensure` is omitted)
    #[default]
    Present,
    /// Resource should be removed
    Absent,
}

impl Ensure {
    pub fn is_absent(self) -> bool {
        self == Ensure::Absent
    }
}

/// Treat an explicit YAML `null` (e.g. `Accounts:` with no items) as an empty list.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accept account ids written either as YAML strings or bare integers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        // account ids are 12 digits; keep leading zeros
        Raw::Number(n) => format!("{:012}", n),
    })
}
