//! Loading the organization spec from disk
//!
//! The format is detected from the file extension:
//! - `.yaml`, `.yml` -> YAML
//! - `.json` -> JSON

use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::OrgSpec;
use crate::validation::validate;
use crate::{Error, Result};

/// Largest spec file we are willing to parse
pub const MAX_SPEC_SIZE: u64 = 1024 * 1024;

/// Loads and validates organization spec files
#[derive(Debug)]
pub struct SpecLoader {
    max_size: u64,
}

impl SpecLoader {
    pub fn new() -> Self {
        Self {
            max_size: MAX_SPEC_SIZE,
        }
    }

    /// Load a spec file and run structural validation on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, cannot be
    /// parsed, or fails validation.
    pub fn load(&self, path: &Path) -> Result<OrgSpec> {
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if metadata.len() > self.max_size {
            return Err(Error::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max: self.max_size,
            });
        }

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let spec: OrgSpec = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                format: "YAML".into(),
                message: e.to_string(),
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            })?,
            _ => {
                return Err(Error::UnsupportedFormat {
                    extension: extension.to_string(),
                });
            }
        };

        tracing::debug!(
            path = %path.display(),
            policies = spec.sc_policies.len(),
            accounts = spec.accounts.len(),
            "Loaded organization spec"
        );

        Self::checked(spec, path.to_path_buf())
    }

    /// Parse and validate a YAML document held in memory.
    pub fn from_yaml_str(&self, content: &str) -> Result<OrgSpec> {
        let path = PathBuf::from("<inline>");
        let spec: OrgSpec = serde_yaml::from_str(content).map_err(|e| Error::Parse {
            path: path.clone(),
            format: "YAML".into(),
            message: e.to_string(),
        })?;
        Self::checked(spec, path)
    }

    fn checked(spec: OrgSpec, path: PathBuf) -> Result<OrgSpec> {
        let issues = validate(&spec);
        if issues.is_empty() {
            Ok(spec)
        } else {
            Err(Error::Invalid { path, issues })
        }
    }
}

impl Default for SpecLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
master_account_id: "111111111111"
default_ou: root
default_policy: FullAWSAccess
organizational_units:
  - Name: root
"#;

    #[test]
    fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("org.yaml");
        fs::write(&path, MINIMAL).unwrap();

        let spec = SpecLoader::new().load(&path).unwrap();
        assert_eq!(spec.default_policy, "FullAWSAccess");
    }

    #[test]
    fn test_load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("org.json");
        let json = r#"{
            "master_account_id": "111111111111",
            "default_ou": "root",
            "default_policy": "FullAWSAccess",
            "organizational_units": [{"Name": "root"}]
        }"#;
        fs::write(&path, json).unwrap();

        let spec = SpecLoader::new().load(&path).unwrap();
        assert!(spec.root().is_some());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("org.toml");
        fs::write(&path, MINIMAL).unwrap();

        let err = SpecLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = SpecLoader::new()
            .load(Path::new("/nonexistent/org.yaml"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_too_large() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("org.yaml");
        fs::write(&path, MINIMAL).unwrap();

        let loader = SpecLoader { max_size: 8 };
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, Error::TooLarge { max: 8, .. }));
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = SpecLoader::new().from_yaml_str("master_account_id: [").unwrap_err();
        assert!(err.to_string().contains("YAML"), "got: {}", err);
    }
}
