//! Application-wide constants for timeouts, schedules, and API paths
//!
//! Central repository for magic numbers so the reconciler, the client and
//! the configuration defaults agree on a single source of truth.

use std::time::Duration;

/// Cluster-control API constants
pub mod api {
    use super::Duration;

    /// Default endpoint of the dedicated-tier cluster API
    pub const DEFAULT_BASE_URL: &str = "https://dedicated.tidbapi.com";

    /// Path prefix for cluster resources
    pub const CLUSTERS_PATH: &str = "/v1beta1/clusters";

    /// Deadline for the status read
    pub const STATUS_TIMEOUT: Duration = Duration::from_secs(15);

    /// Deadline for a pause/resume request
    pub const TRANSITION_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Default schedules, 6-field cron (sec min hour day month dow)
pub mod schedule {
    /// Resume every morning at 07:00
    pub const DEFAULT_RESUME_CRON: &str = "0 0 7 * * *";

    /// Pause every evening at 23:00
    pub const DEFAULT_PAUSE_CRON: &str = "0 0 23 * * *";
}

/// Alert webhook constants
pub mod alerts {
    use super::Duration;

    pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Cleanup of in-flight run bookkeeping
pub mod cleanup {
    /// Runs older than this are considered stuck and dropped from the tracker
    pub const STALE_RUN_MINUTES: i64 = 60;

    /// How often the tracker cleanup task runs
    pub const CLEANUP_INTERVAL_SECONDS: u64 = 300;
}

/// Environment variables recognized as configuration overrides
pub mod env {
    pub const CONFIG_DIR: &str = "LIFECYCLE_CONFIG_DIR";
    pub const CLUSTER_ID: &str = "TIDB_CLOUD_CLUSTER_ID";
    pub const PUBLIC_KEY: &str = "TIDB_CLOUD_PUBLIC_KEY";
    pub const PRIVATE_KEY: &str = "TIDB_CLOUD_PRIVATE_KEY";
    pub const RESUME_SCHEDULE: &str = "RESUME_SCHEDULE_CRON";
    pub const PAUSE_SCHEDULE: &str = "PAUSE_SCHEDULE_CRON";
    pub const DISABLE_SCHEDULE: &str = "DISABLE_SCHEDULE";
}
