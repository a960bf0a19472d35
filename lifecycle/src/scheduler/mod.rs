//! Cron-based triggering of lifecycle runs
//!
//! Two jobs at most, both 6-field cron (sec min hour day month dow) in the
//! timezone of the host:
//!
//! ```toml
//! resume_schedule = "0 0 7 * * *"   # bring the cluster up at 07:00
//! pause_schedule = "0 0 23 * * *"   # pause it at 23:00
//! ```
//!
//! An empty expression leaves that direction unscheduled.

pub mod jobs;
pub use jobs::LifecycleScheduler;

use anyhow::{anyhow, Result};

pub fn validate_6_field_cron(schedule: &str) -> Result<()> {
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(anyhow!(
            "Expected 6 fields (sec min hour day month dow), got {}: '{}'",
            fields.len(),
            schedule
        ));
    }
    Ok(())
}
