// Health, in-flight runs and schedule endpoints

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use super::common::{ApiResponse, ApiResult};
use crate::operation_tracker::RunStatus;
use crate::reconciler::DesiredState;
use crate::web::AppState;

pub async fn get_health(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(ApiResponse::success(json!({
        "status": "ok",
        "cluster_id": state.config.cluster_id,
        "schedule_disabled": state.lifecycle_service.is_disabled(),
    }))))
}

pub async fn get_active_operations(State(state): State<AppState>) -> ApiResult<RunStatus> {
    let status = state.lifecycle_service.tracker().status().await;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn get_schedule(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(ApiResponse::success(json!({
        "resume": state.config.schedule_for(DesiredState::Running),
        "pause": state.config.schedule_for(DesiredState::Paused),
        "disabled": state.config.disable_schedule,
    }))))
}
