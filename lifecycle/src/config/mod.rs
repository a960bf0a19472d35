pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cloud::{ClientTimeouts, Credentials};
use crate::constants::{api, schedule};
use crate::reconciler::{DesiredState, ReconcilerSettings};

pub use manager::ConfigManager;
pub use secrets::SecretsLoader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Empty string disables the resume job
    #[serde(default = "default_resume_schedule")]
    pub resume_schedule: String,
    /// Empty string disables the pause job
    #[serde(default = "default_pause_schedule")]
    pub pause_schedule: String,
    /// Kill switch for the automation itself, not for the cluster
    #[serde(default)]
    pub disable_schedule: bool,
    #[serde(default = "default_status_timeout")]
    pub status_timeout_seconds: u64,
    #[serde(default = "default_transition_timeout")]
    pub transition_timeout_seconds: u64,
    #[serde(default)]
    pub alarm_webhook_url: String,
    // Populated from secrets.toml and the environment
    #[serde(skip)]
    pub credentials: Credentials,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8095
}

fn default_api_base_url() -> String {
    api::DEFAULT_BASE_URL.to_string()
}

fn default_resume_schedule() -> String {
    schedule::DEFAULT_RESUME_CRON.to_string()
}

fn default_pause_schedule() -> String {
    schedule::DEFAULT_PAUSE_CRON.to_string()
}

fn default_status_timeout() -> u64 {
    api::STATUS_TIMEOUT.as_secs()
}

fn default_transition_timeout() -> u64 {
    api::TRANSITION_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cluster_id: String::new(),
            api_base_url: default_api_base_url(),
            resume_schedule: default_resume_schedule(),
            pause_schedule: default_pause_schedule(),
            disable_schedule: false,
            status_timeout_seconds: default_status_timeout(),
            transition_timeout_seconds: default_transition_timeout(),
            alarm_webhook_url: String::new(),
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Cron expression driving `desired`, if that direction is scheduled
    pub fn schedule_for(&self, desired: DesiredState) -> Option<&str> {
        let expr = match desired {
            DesiredState::Running => self.resume_schedule.trim(),
            DesiredState::Paused => self.pause_schedule.trim(),
        };
        (!expr.is_empty()).then_some(expr)
    }

    pub fn client_timeouts(&self) -> ClientTimeouts {
        ClientTimeouts {
            status: Duration::from_secs(self.status_timeout_seconds),
            transition: Duration::from_secs(self.transition_timeout_seconds),
        }
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            disabled: self.disable_schedule,
        }
    }
}
