//! Secrets loader for the cluster API key pair.
//!
//! The key pair lives in a separate TOML file (config/secrets.toml) that
//! should be excluded from version control. Environment variables override it.
//!
//! Example secrets.toml:
//! ```toml
//! [tidb_cloud]
//! public_key = "ABCD1234"
//! private_key = "00000000-0000-0000-0000-000000000000"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::cloud::Credentials;

/// Structure matching the secrets.toml file format
#[derive(Debug, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub tidb_cloud: Option<Credentials>,
}

pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, API keys must come from the environment",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!(
            "Loaded API key pair from {:?}: {}",
            secrets_path,
            if secrets.tidb_cloud.is_some() { "present" } else { "absent" }
        );

        Ok(Self { secrets })
    }

    pub fn credentials(&self) -> Credentials {
        self.secrets.tidb_cloud.clone().unwrap_or_default()
    }
}
