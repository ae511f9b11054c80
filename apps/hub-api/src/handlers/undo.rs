//! 撤销 handlers
//!
//! POST 消费栈顶快照并回放恢复命令；GET 只探测可用性，不消费。

use crate::AppState;
use crate::handlers::spaces::SpacePath;
use crate::utils::response::{space_not_found_error, state_error, undo_not_available_error};
use api_contract::{ApiResponse, UndoAvailabilityDto};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 执行撤销（消费栈顶条目）
pub async fn trigger_undo(State(state): State<AppState>, Path(path): Path<SpacePath>) -> Response {
    match state.catalog.find_space(&path.space_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return space_not_found_error(),
        Err(err) => return state_error(err.into()),
    }
    match state.undo_executor.execute(&path.space_id).await {
        Some(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))).into_response(),
        None => undo_not_available_error(),
    }
}

/// 探测撤销可用性（不消费）
pub async fn peek_undo(State(state): State<AppState>, Path(path): Path<SpacePath>) -> Response {
    match state.catalog.find_space(&path.space_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return space_not_found_error(),
        Err(err) => return state_error(err.into()),
    }
    let entry = state.undo.peek_entry(&path.space_id);
    let dto = UndoAvailabilityDto {
        available: entry.is_some(),
        entry,
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}
