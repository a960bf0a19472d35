// Cluster state and manual trigger endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::common::{api_error, ApiResponse, ApiResult};
use crate::operation_tracker::Trigger;
use crate::reconciler::{ClusterState, DesiredState, ReconcileOutcome};
use crate::services::RunReport;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub desired: String,
}

/// Current remote state, without deciding anything
pub async fn get_cluster_state(State(state): State<AppState>) -> ApiResult<Value> {
    let status = state
        .lifecycle_service
        .cluster_state()
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))?;

    let parsed = ClusterState::parse(&status.state);

    Ok(Json(ApiResponse::success(json!({
        "cluster_id": state.lifecycle_service.cluster_id(),
        "display_name": status.display_name,
        "state": status.state,
        "recognized": parsed.is_known(),
    }))))
}

/// Run one reconcile now, racing the schedule like any other trigger
pub async fn trigger_reconcile(
    State(state): State<AppState>,
    Json(request): Json<ReconcileRequest>,
) -> ApiResult<ReconcileOutcome> {
    let desired: DesiredState = request
        .desired
        .parse()
        .map_err(|e: String| api_error(StatusCode::BAD_REQUEST, e))?;

    info!("Manual reconcile toward {} requested", desired);

    match state.lifecycle_service.run(desired, Trigger::Manual).await {
        RunReport::Completed(outcome) => {
            let message = outcome.summary();
            let success = outcome.success;
            Ok(Json(ApiResponse::completed(outcome, success, message)))
        }
        RunReport::Overlapping(reason) => Err(api_error(StatusCode::CONFLICT, reason)),
    }
}
