
pub mod alert_service;
pub mod lifecycle_service;

pub use alert_service::AlertService;
pub use lifecycle_service::{LifecycleService, RunReport};
