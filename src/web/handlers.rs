use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{ApiResponse, AppState, WebError};
use crate::item_manager::{AddItemRequest, SettingUpdate};
use crate::models::{RefreshCycleSummary, SystemSetting, TrackedItem};

// Item handlers
pub async fn list_items(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<TrackedItem>>>, WebError> {
    let items = state
        .items
        .list_items()
        .await
        .map_err(|e| WebError::from_app(e, "Failed to fetch items"))?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TrackedItem>>), WebError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Malformed add-item body");
        WebError::bad_request("URL is required")
    })?;

    match state.items.add_item(request).await {
        Ok(item) => Ok((StatusCode::CREATED, Json(ApiResponse::success(item)))),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add item");
            Err(WebError::from_app(e, "Failed to add item"))
        }
    }
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, WebError> {
    state
        .items
        .delete_item(&id)
        .await
        .map_err(|e| WebError::from_app(e, "Failed to delete item"))?;
    Ok(Json(ApiResponse::success(serde_json::json!({ "deleted": id }))))
}

// Refresh triggers
pub async fn scheduled_refresh(State(state): State<AppState>) -> Result<Json<ApiResponse<RefreshCycleSummary>>, WebError> {
    tracing::info!("Scheduled refresh triggered");
    run_refresh(state).await
}

pub async fn manual_refresh(State(state): State<AppState>) -> Result<Json<ApiResponse<RefreshCycleSummary>>, WebError> {
    tracing::info!("Manual refresh triggered");
    run_refresh(state).await
}

async fn run_refresh(state: AppState) -> Result<Json<ApiResponse<RefreshCycleSummary>>, WebError> {
    let summary = state
        .items
        .run_refresh_cycle()
        .await
        .map_err(|e| WebError::from_app(e, "Failed to refresh prices"))?;
    Ok(Json(ApiResponse::success(summary)))
}

// Settings
pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<SettingUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<SystemSetting>>, WebError> {
    let Json(update) = payload.map_err(|_| WebError::bad_request("Value is required"))?;
    let setting = state
        .items
        .set_setting(&key, update)
        .await
        .map_err(|e| WebError::from_app(e, "Failed to save setting"))?;
    Ok(Json(ApiResponse::success(setting)))
}
