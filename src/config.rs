//! Pipeline configuration
//!
//! An immutable [`PipelineConfig`] is loaded once at startup and passed
//! explicitly into the pipeline entry points. Nothing here mutates process
//! environment or other global state; storage credentials travel inside the
//! config and are handed to the storage layer directly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the input root URL.
pub const ENV_INPUT_ROOT: &str = "TUNELAKE_INPUT_ROOT";
/// Environment variable overriding the output root URL.
pub const ENV_OUTPUT_ROOT: &str = "TUNELAKE_OUTPUT_ROOT";

/// Complete pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root URL for input data (`s3://bucket/prefix`, `gs://`, `az://`, or a
    /// local path). Song files are expected under `song_data/`, log files
    /// under `log_data/`.
    pub input_root: String,

    /// Root URL for the partitioned table outputs.
    pub output_root: String,

    /// Object-storage credentials, if the roots need them.
    #[serde(default)]
    pub credentials: Option<StorageCredentials>,
}

/// Object-storage access credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageCredentials {
    /// Access key id
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,
}

// Keep the secret out of Debug/log output.
impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .finish()
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let mut config: PipelineConfig = serde_yaml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Build configuration purely from environment variables.
    pub fn from_env() -> Result<Self> {
        let input_root =
            std::env::var(ENV_INPUT_ROOT).map_err(|_| Error::missing_field("input_root"))?;
        let output_root =
            std::env::var(ENV_OUTPUT_ROOT).map_err(|_| Error::missing_field("output_root"))?;

        let mut config = Self {
            input_root,
            output_root,
            credentials: None,
        };
        config.credentials = credentials_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over file values when both are present.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_INPUT_ROOT) {
            self.input_root = v;
        }
        if let Ok(v) = std::env::var(ENV_OUTPUT_ROOT) {
            self.output_root = v;
        }
        if self.credentials.is_none() {
            self.credentials = credentials_from_env();
        }
    }

    /// Validate that required fields are non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.input_root.trim().is_empty() {
            return Err(Error::missing_field("input_root"));
        }
        if self.output_root.trim().is_empty() {
            return Err(Error::missing_field("output_root"));
        }
        Ok(())
    }
}

fn credentials_from_env() -> Option<StorageCredentials> {
    let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
    let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
    Some(StorageCredentials {
        access_key_id,
        secret_access_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
input_root: "s3://source-bucket/"
output_root: "s3://lake-bucket/warehouse/"
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.input_root, "s3://source-bucket/");
        assert_eq!(config.output_root, "s3://lake-bucket/warehouse/");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_parse_config_with_credentials() {
        let yaml = r#"
input_root: "s3://source-bucket/"
output_root: "s3://lake-bucket/warehouse/"
credentials:
  access_key_id: "AKIA123"
  secret_access_key: "shhh"
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        let creds = config.credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKIA123");
        assert_eq!(creds.secret_access_key, "shhh");
    }

    #[test]
    fn test_secret_masked_in_debug() {
        let creds = StorageCredentials {
            access_key_id: "AKIA123".to_string(),
            secret_access_key: "shhh".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("AKIA123"));
        assert!(!rendered.contains("shhh"));
    }

    #[test]
    fn test_validate_rejects_empty_roots() {
        let config = PipelineConfig {
            input_root: String::new(),
            output_root: "/out".to_string(),
            credentials: None,
        };
        assert!(config.validate().is_err());
    }
}
