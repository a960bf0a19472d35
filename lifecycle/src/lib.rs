pub mod cloud;
pub mod config;
pub mod constants;
pub mod errors;
pub mod operation_tracker;
pub mod reconciler;
pub mod scheduler;
pub mod services;
pub mod web;

// Re-export commonly used types
pub use cloud::{Credentials, TidbCloudClient};
pub use config::{Config, ConfigManager};
pub use operation_tracker::{OperationTracker, Trigger};
pub use reconciler::{ClusterReconciler, ClusterState, DesiredState, ErrorKind, ReconcileOutcome};
pub use scheduler::LifecycleScheduler;
pub use services::{AlertService, LifecycleService, RunReport};
