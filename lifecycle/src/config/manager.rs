use super::{Config, SecretsLoader};
use crate::constants::env;
use crate::errors::ConfigError;
use crate::scheduler::validate_6_field_cron;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug)]
pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    /// Load `main.toml` and `secrets.toml` from `config_dir`, then apply
    /// process environment overrides.
    pub async fn new(config_dir: String) -> Result<Self> {
        Self::with_env(config_dir, |key| std::env::var(key).ok()).await
    }

    /// Same as `new`, with an explicit environment lookup.
    pub async fn with_env<F>(config_dir: String, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_configuration(&config_dir).await?;
        apply_env_overrides(&mut config, lookup)?;
        validate(&config)?;

        info!(
            "Configuration ready for cluster {} (resume: '{}', pause: '{}', disabled: {})",
            config.cluster_id, config.resume_schedule, config.pause_schedule, config.disable_schedule
        );

        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);

        let mut config: Config = if Path::new(&main_config_path).exists() {
            let content = fs::read_to_string(&main_config_path).await.map_err(|e| {
                ConfigError::LoadFailed {
                    path: main_config_path.clone(),
                    reason: e.to_string(),
                }
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                reason: format!("{}: {}", main_config_path, e),
            })?
        } else {
            debug!("No {} found, using defaults", main_config_path);
            Config::default()
        };

        let secrets_path = format!("{}/secrets.toml", config_dir);
        config.credentials = SecretsLoader::load(Path::new(&secrets_path))?.credentials();

        Ok(config)
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(cluster_id) = lookup(env::CLUSTER_ID) {
        config.cluster_id = cluster_id;
    }
    if let Some(public_key) = lookup(env::PUBLIC_KEY) {
        config.credentials.public_key = public_key;
    }
    if let Some(private_key) = lookup(env::PRIVATE_KEY) {
        config.credentials.private_key = private_key;
    }
    if let Some(cron) = lookup(env::RESUME_SCHEDULE) {
        config.resume_schedule = cron;
    }
    if let Some(cron) = lookup(env::PAUSE_SCHEDULE) {
        config.pause_schedule = cron;
    }
    if let Some(flag) = lookup(env::DISABLE_SCHEDULE) {
        config.disable_schedule = parse_flag(env::DISABLE_SCHEDULE, &flag)?;
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.cluster_id.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "cluster_id".to_string(),
        });
    }
    if config.credentials.public_key.is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "tidb_cloud.public_key".to_string(),
        });
    }
    if config.credentials.private_key.is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "tidb_cloud.private_key".to_string(),
        });
    }
    if config.status_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            field: "status_timeout_seconds".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.transition_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            field: "transition_timeout_seconds".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    for (field, expr) in [
        ("resume_schedule", &config.resume_schedule),
        ("pause_schedule", &config.pause_schedule),
    ] {
        if expr.trim().is_empty() {
            continue;
        }
        validate_6_field_cron(expr).map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
    }
    reqwest::Url::parse(&config.api_base_url)
        .map_err(|e| ConfigError::InvalidValue {
            field: "api_base_url".to_string(),
            reason: e.to_string(),
        })
        .map(|_| ())
}
