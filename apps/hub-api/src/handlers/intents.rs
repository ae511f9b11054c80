//! 意图查询 handlers
//!
//! 注册表只保留活跃意图：已完成/已过期的意图查不到，
//! 历史记录走 /spaces/{id}/history。

use crate::AppState;
use crate::utils::response::intent_not_found_error;
use api_contract::{ActiveIntentsQuery, ApiResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hub_intents::ActiveFilter;

#[derive(serde::Deserialize)]
pub struct IntentPath {
    intent_id: String,
}

/// 查询单个活跃意图
pub async fn get_intent(State(state): State<AppState>, Path(path): Path<IntentPath>) -> Response {
    match state.intents.get_intent(&path.intent_id) {
        Some(record) => (StatusCode::OK, Json(ApiResponse::success(record))).into_response(),
        None => intent_not_found_error(),
    }
}

/// 按设备/空间过滤活跃意图
pub async fn list_active_intents(
    State(state): State<AppState>,
    Query(query): Query<ActiveIntentsQuery>,
) -> Response {
    let filter = ActiveFilter {
        device_id: query.device_id,
        space_id: query.space_id,
    };
    let records = state.intents.find_active(&filter);
    (StatusCode::OK, Json(ApiResponse::success(records))).into_response()
}
