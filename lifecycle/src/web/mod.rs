pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::services::LifecycleService;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lifecycle_service: Arc<LifecycleService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, lifecycle_service: Arc<LifecycleService>) -> Self {
        Self {
            config,
            lifecycle_service,
        }
    }
}
