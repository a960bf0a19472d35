use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cloud::{ClusterStatus, TidbCloudClient};
use crate::config::Config;
use crate::errors::LifecycleError;
use crate::operation_tracker::{OperationTracker, Trigger};
use crate::reconciler::{ClusterReconciler, DesiredState, ReconcileOutcome};
use crate::services::alert_service::AlertService;

/// What a scheduler or API caller gets back from one run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "outcome", rename_all = "snake_case")]
pub enum RunReport {
    Completed(ReconcileOutcome),
    /// Another run for the same cluster was still in flight in this process
    Overlapping(String),
}

impl RunReport {
    pub fn outcome(&self) -> Option<&ReconcileOutcome> {
        match self {
            RunReport::Completed(outcome) => Some(outcome),
            RunReport::Overlapping(_) => None,
        }
    }
}

/// Entry point shared by the cron jobs and the manual trigger API
pub struct LifecycleService {
    config: Arc<Config>,
    client: Arc<TidbCloudClient>,
    reconciler: ClusterReconciler,
    tracker: Arc<OperationTracker>,
    alert_service: Arc<AlertService>,
}

impl LifecycleService {
    pub fn new(
        config: Arc<Config>,
        client: Arc<TidbCloudClient>,
        tracker: Arc<OperationTracker>,
        alert_service: Arc<AlertService>,
    ) -> Self {
        let reconciler = ClusterReconciler::new(client.clone(), config.reconciler_settings());
        Self {
            config,
            client,
            reconciler,
            tracker,
            alert_service,
        }
    }

    pub fn cluster_id(&self) -> &str {
        &self.config.cluster_id
    }

    pub fn is_disabled(&self) -> bool {
        self.reconciler.is_disabled()
    }

    pub fn tracker(&self) -> Arc<OperationTracker> {
        self.tracker.clone()
    }

    pub async fn run(&self, desired: DesiredState, trigger: Trigger) -> RunReport {
        let cluster_id = self.config.cluster_id.as_str();

        if self.is_disabled() {
            let outcome = self
                .reconciler
                .reconcile(cluster_id, desired, &self.config.credentials)
                .await;
            info!("{} run: {}", trigger, outcome.summary());
            return RunReport::Completed(outcome);
        }

        let guard = match self.tracker.begin(cluster_id, desired, trigger).await {
            Ok(guard) => guard,
            Err(e) => {
                warn!("Skipping {} run toward {}: {}", trigger, desired, e);
                return RunReport::Overlapping(e.to_string());
            }
        };

        let outcome = self
            .reconciler
            .reconcile(cluster_id, desired, &self.config.credentials)
            .await;

        drop(guard);

        if outcome.success || outcome.superseded {
            info!("{} run: {}", trigger, outcome.summary());
        } else {
            warn!("{} run failed: {}", trigger, outcome.summary());
        }

        if let Err(e) = self.alert_service.notify_outcome(&outcome).await {
            error!("Failed to send lifecycle alert: {}", e);
        }

        RunReport::Completed(outcome)
    }

    /// Read-only status fetch, no decision made
    pub async fn cluster_state(&self) -> Result<ClusterStatus, LifecycleError> {
        self.client
            .get_status(&self.config.cluster_id, &self.config.credentials)
            .await
            .map_err(LifecycleError::from)
    }
}
