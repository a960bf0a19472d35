//! In-flight run tracking
//!
//! A slow run may still be waiting on the cluster API when the next timer
//! fires, or a manual trigger may race a scheduled one. Within this process
//! only one run per cluster is allowed at a time; across processes the
//! deployment has to serialize runs itself.
//!
//! ```ignore
//! let guard = tracker.begin("1379661944646413143", DesiredState::Paused, Trigger::Scheduled).await?;
//! // reconcile...
//! drop(guard); // also released if the run is cancelled
//! ```

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::reconciler::DesiredState;

/// What started a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Scheduled => write!(f, "scheduled"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveRun {
    pub run_id: String,
    pub cluster_id: String,
    pub desired: DesiredState,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub active_runs: HashMap<String, ActiveRun>,
    pub total_active: usize,
}

#[derive(Clone, Default)]
pub struct OperationTracker {
    active: Arc<RwLock<HashMap<String, ActiveRun>>>, // cluster_id -> run
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run for `cluster_id`. Fails if one is already in flight.
    #[instrument(skip_all, fields(cluster = %cluster_id, desired = %desired, trigger = %trigger))]
    pub async fn try_start(
        &self,
        cluster_id: &str,
        desired: DesiredState,
        trigger: Trigger,
    ) -> Result<ActiveRun> {
        let mut active = self.active.write().await;

        if let Some(current) = active.get(cluster_id) {
            let seconds = Utc::now()
                .signed_duration_since(current.started_at)
                .num_seconds();
            return Err(anyhow::anyhow!(
                "Cluster {} already has a {} run toward {} in flight (started {}s ago)",
                cluster_id,
                current.trigger,
                current.desired,
                seconds
            ));
        }

        let run = ActiveRun {
            run_id: Uuid::new_v4().to_string(),
            cluster_id: cluster_id.to_string(),
            desired,
            trigger,
            started_at: Utc::now(),
        };

        active.insert(cluster_id.to_string(), run.clone());
        info!("Started {} run {} toward {}", trigger, run.run_id, desired);
        Ok(run)
    }

    #[instrument(skip(self), fields(cluster = %cluster_id))]
    pub async fn finish(&self, cluster_id: &str) {
        let mut active = self.active.write().await;
        if let Some(run) = active.remove(cluster_id) {
            let took = Utc::now().signed_duration_since(run.started_at);
            info!(
                "Finished run {} on {} (took {}ms)",
                run.run_id,
                cluster_id,
                took.num_milliseconds()
            );
        }
    }

    pub async fn is_busy(&self, cluster_id: &str) -> bool {
        self.active.read().await.contains_key(cluster_id)
    }

    pub async fn status(&self) -> RunStatus {
        let active = self.active.read().await;
        RunStatus {
            active_runs: active.clone(),
            total_active: active.len(),
        }
    }

    /// Drop runs older than `max_minutes`. A run can only get stuck if its
    /// task was aborted before `finish`.
    pub async fn cleanup_stale(&self, max_minutes: i64) -> usize {
        let mut active = self.active.write().await;
        let cutoff = Utc::now() - chrono::Duration::minutes(max_minutes);
        let before = active.len();

        active.retain(|cluster_id, run| {
            let keep = run.started_at > cutoff;
            if !keep {
                warn!(
                    "Dropping stale run {} on {} started at {}",
                    run.run_id, cluster_id, run.started_at
                );
            }
            keep
        });

        before - active.len()
    }

    /// Like `try_start`, but the slot is released when the returned guard
    /// is dropped, including when the run's future is cancelled.
    pub async fn begin(
        &self,
        cluster_id: &str,
        desired: DesiredState,
        trigger: Trigger,
    ) -> Result<RunGuard> {
        let run = self.try_start(cluster_id, desired, trigger).await?;
        Ok(RunGuard {
            tracker: self.clone(),
            cluster_id: run.cluster_id,
            run_id: run.run_id,
        })
    }

    async fn release(&self, cluster_id: &str, run_id: &str) {
        let mut active = self.active.write().await;
        remove_run(&mut active, cluster_id, run_id);
    }
}

// Only the run that owns the slot may free it
fn remove_run(active: &mut HashMap<String, ActiveRun>, cluster_id: &str, run_id: &str) {
    if active.get(cluster_id).is_some_and(|run| run.run_id == run_id) {
        if let Some(run) = active.remove(cluster_id) {
            let took = Utc::now().signed_duration_since(run.started_at);
            info!(
                "Released run {} on {} (took {}ms)",
                run.run_id,
                cluster_id,
                took.num_milliseconds()
            );
        }
    }
}

/// Holds a cluster's slot for the lifetime of one run
pub struct RunGuard {
    tracker: OperationTracker,
    cluster_id: String,
    run_id: String,
}

impl RunGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = self.tracker.active.try_write() {
            remove_run(&mut active, &self.cluster_id, &self.run_id);
            return;
        }

        // Lock is contended; finish the release on the runtime
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let tracker = self.tracker.clone();
                let cluster_id = std::mem::take(&mut self.cluster_id);
                let run_id = std::mem::take(&mut self.run_id);
                handle.spawn(async move {
                    tracker.release(&cluster_id, &run_id).await;
                });
            }
            Err(_) => warn!(
                "Run {} on {} dropped outside a runtime, slot left for stale cleanup",
                self.run_id, self.cluster_id
            ),
        }
    }
}
