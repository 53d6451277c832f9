//! Service control policy documents
//!
//! Spec policies render to a single-statement document. Deployed documents
//! come back from the service in whatever layout they were stored with, so
//! comparisons go through [`normalize`] first.

use serde_json::{Value, json};

use orgs_spec::{Effect, PolicySpec};

pub const POLICY_VERSION: &str = "2012-10-17";

/// Keys whose values may be a single string or a list of strings
const LIST_KEYS: &[&str] = &["Action", "NotAction", "Resource", "NotResource"];

/// A single-statement policy document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub effect: Effect,
    pub actions: Vec<String>,
}

impl PolicyDocument {
    pub fn new(effect: Effect, actions: Vec<String>) -> Self {
        Self { effect, actions }
    }

    pub fn from_spec(spec: &PolicySpec) -> Self {
        Self::new(spec.effect, spec.actions.clone())
    }

    pub fn to_value(&self) -> Value {
        json!({
            "Version": POLICY_VERSION,
            "Statement": [{
                "Effect": self.effect.to_string(),
                "Action": self.actions,
                "Resource": "*",
            }],
        })
    }

    /// Compact JSON text sent to the service
    pub fn render(&self) -> String {
        self.to_value().to_string()
    }
}

/// Canonical form of a policy document.
///
/// Object key order and whitespace never matter once parsed. On top of that
/// a lone `Statement` object becomes a one-element list, scalar
/// action/resource values become lists, and those lists are sorted.
pub fn normalize(mut value: Value) -> Value {
    canonicalize(&mut value);
    value
}

fn canonicalize(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key == "Statement" && v.is_object() {
                    let statement = v.take();
                    *v = Value::Array(vec![statement]);
                } else if LIST_KEYS.contains(&key.as_str()) {
                    if v.is_string() {
                        let single = v.take();
                        *v = Value::Array(vec![single]);
                    }
                    if let Value::Array(items) = v {
                        items.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
                    }
                }
                canonicalize(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(canonicalize),
        _ => {}
    }
}

/// Compare two JSON policy documents after normalization.
///
/// A document that is not valid JSON never equals anything.
pub fn documents_equal(left: &str, right: &str) -> bool {
    match (
        serde_json::from_str::<Value>(left),
        serde_json::from_str::<Value>(right),
    ) {
        (Ok(l), Ok(r)) => normalize(l) == normalize(r),
        (l, r) => {
            tracing::warn!(
                left_valid = l.is_ok(),
                right_valid = r.is_ok(),
                "Policy document is not valid JSON"
            );
            false
        }
    }
}

/// Pretty-print a policy document for humans; falls back to the raw text.
pub fn pretty(content: &str) -> String {
    serde_json::from_str::<Value>(content)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| content.to_string())
}
