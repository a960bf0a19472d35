use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument, warn};

use super::validate_6_field_cron;
use crate::config::Config;
use crate::operation_tracker::Trigger;
use crate::reconciler::DesiredState;
use crate::services::{LifecycleService, RunReport};

pub struct LifecycleScheduler {
    config: Arc<Config>,
    lifecycle_service: Arc<LifecycleService>,
    scheduler: JobScheduler,
}

impl LifecycleScheduler {
    pub async fn new(config: Arc<Config>, lifecycle_service: Arc<LifecycleService>) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            config,
            lifecycle_service,
            scheduler,
        })
    }

    /// Register the configured jobs and start the scheduler. Returns the
    /// number of jobs registered.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<usize> {
        info!("Starting lifecycle scheduler with 6-field cron format (sec min hour day month dow)");
        let mut scheduled_count = 0;

        for desired in [DesiredState::Running, DesiredState::Paused] {
            let Some(schedule) = self.config.schedule_for(desired) else {
                info!("No schedule configured toward {}", desired);
                continue;
            };

            match self.schedule_job(desired, schedule.to_string()).await {
                Ok(()) => {
                    scheduled_count += 1;
                    info!("✓ Scheduled {} for {}: {}", desired.transition(), self.config.cluster_id, schedule);
                }
                Err(e) => {
                    error!("✗ Failed to schedule {}: {} (schedule: {})", desired.transition(), e, schedule);
                }
            }
        }

        if scheduled_count > 0 {
            self.scheduler
                .start()
                .await
                .map_err(|e| anyhow!("Failed to start scheduler: {}", e))?;
            info!("✓ Lifecycle scheduler started with {} jobs", scheduled_count);
        } else {
            warn!("No scheduled jobs configured - scheduler not started");
        }

        if self.config.disable_schedule {
            warn!("Kill switch is on: scheduled runs will fire but do nothing");
        }

        Ok(scheduled_count)
    }

    async fn schedule_job(&self, desired: DesiredState, schedule: String) -> Result<()> {
        validate_6_field_cron(&schedule)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", schedule, e))?;

        let lifecycle_service = self.lifecycle_service.clone();

        let job = Job::new_async(schedule.as_str(), move |_uuid, _scheduler| {
            let lifecycle_service = lifecycle_service.clone();

            Box::pin(async move {
                info!("⏰ Scheduled run toward {}", desired);

                match lifecycle_service.run(desired, Trigger::Scheduled).await {
                    RunReport::Completed(outcome) if outcome.success => {}
                    RunReport::Completed(outcome) => {
                        warn!(
                            "Scheduled run toward {} ended with {:?}; next firing will retry",
                            desired, outcome.error
                        );
                    }
                    RunReport::Overlapping(reason) => {
                        warn!("Scheduled run toward {} skipped: {}", desired, reason);
                    }
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create job for '{}': {}", schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add job to scheduler: {}", e))?;

        Ok(())
    }
}
