use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use lifecycle::constants::{cleanup, env};
use lifecycle::web::{start_web_server, AppState};
use lifecycle::{
    AlertService, ConfigManager, LifecycleScheduler, LifecycleService, OperationTracker,
    TidbCloudClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("lifecycle=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting cluster lifecycle automation");

    let config_dir = std::env::var(env::CONFIG_DIR).unwrap_or_else(|_| "config".to_string());
    let config_manager = ConfigManager::new(config_dir.clone())
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_dir))?;
    let config = config_manager.get_current_config();

    let client = Arc::new(TidbCloudClient::new(
        config.api_base_url.clone(),
        config.client_timeouts(),
    )?);
    info!(
        "Cluster API client ready for {} (status timeout {}s, transition timeout {}s)",
        client.base_url(),
        config.status_timeout_seconds,
        config.transition_timeout_seconds
    );

    let alert_service = Arc::new(AlertService::new(config.alarm_webhook_url.clone())?);
    if alert_service.is_enabled() {
        info!(
            "Alert service enabled with webhook: {}",
            alert_service.get_webhook_url()
        );
    } else {
        warn!("Alert service disabled - set alarm_webhook_url to receive failure alerts");
    }

    let tracker = Arc::new(OperationTracker::new());
    let lifecycle_service = Arc::new(LifecycleService::new(
        config.clone(),
        client,
        tracker.clone(),
        alert_service,
    ));

    if lifecycle_service.is_disabled() {
        warn!("⚠️  Schedule kill switch is ON - every run is a no-op");
    }

    // Stuck-run cleanup
    let tracker_clone = tracker.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            cleanup::CLEANUP_INTERVAL_SECONDS,
        ));
        loop {
            interval.tick().await;
            let cleaned = tracker_clone.cleanup_stale(cleanup::STALE_RUN_MINUTES).await;
            if cleaned > 0 {
                warn!(
                    "Cleaned up {} stale runs older than {} minutes",
                    cleaned,
                    cleanup::STALE_RUN_MINUTES
                );
            }
        }
    });

    let scheduler = LifecycleScheduler::new(config.clone(), lifecycle_service.clone()).await?;
    let jobs = scheduler.start().await?;
    info!("Scheduler running with {} jobs", jobs);

    let state = AppState::new(config, lifecycle_service);
    if let Err(e) = start_web_server(state).await {
        error!("Web server stopped: {}", e);
        return Err(e);
    }

    Ok(())
}
