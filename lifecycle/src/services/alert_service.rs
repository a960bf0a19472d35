use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::constants::alerts;
use crate::reconciler::{DesiredState, ErrorKind, ReconcileOutcome};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum AlertSeverity {
    Warning,
    Recovery,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub cluster_id: String,
    pub desired: DesiredState,
    pub error: Option<ErrorKind>,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

pub struct AlertService {
    webhook_url: String,
    client: Client,
    // cluster_id -> last run failed
    last_failed: Arc<Mutex<HashMap<String, bool>>>,
}

impl AlertService {
    pub fn new(webhook_url: String) -> Result<Self> {
        Self::with_timeout(webhook_url, alerts::WEBHOOK_TIMEOUT)
    }

    /// Every delivery is bounded by `timeout`
    pub fn with_timeout(webhook_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build alert webhook client: {}", e))?;

        Ok(Self {
            webhook_url,
            client,
            last_failed: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    pub fn get_webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Decide whether an outcome deserves an alert and send it.
    ///
    /// Failures alert every time; the first success after a failure sends one
    /// recovery. Superseded rejections and kill-switch skips never alert and
    /// do not count as a recovery.
    pub async fn notify_outcome(&self, outcome: &ReconcileOutcome) -> Result<()> {
        if outcome.disabled {
            return Ok(());
        }

        // Lost race: neither a failure nor a success, failure streak unchanged
        if outcome.superseded {
            return Ok(());
        }

        let failed = !outcome.success;
        let previously_failed = {
            let mut last = self.last_failed.lock().await;
            last.insert(outcome.cluster_id.clone(), failed)
                .unwrap_or(false)
        };

        let severity = match (failed, previously_failed) {
            (true, _) => AlertSeverity::Warning,
            (false, true) => AlertSeverity::Recovery,
            (false, false) => return Ok(()),
        };

        let payload = AlertPayload {
            timestamp: Utc::now(),
            severity,
            cluster_id: outcome.cluster_id.clone(),
            desired: outcome.desired,
            error: outcome.error,
            message: outcome.summary(),
            details: serde_json::to_value(outcome).ok(),
        };

        self.send(&payload).await
    }

    async fn send(&self, payload: &AlertPayload) -> Result<()> {
        if !self.is_enabled() {
            debug!(
                "Alert service disabled, not sending {:?} for {}",
                payload.severity, payload.cluster_id
            );
            return Ok(());
        }

        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to deliver alert: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Alert webhook returned {}", status);
            return Err(anyhow::anyhow!("Alert webhook returned status {}", status));
        }

        info!(
            "Sent {:?} alert for {}: {}",
            payload.severity, payload.cluster_id, payload.message
        );
        Ok(())
    }
}
