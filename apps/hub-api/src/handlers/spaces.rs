//! 空间编排与状态 handlers
//!
//! 每个域一对接口：
//! - POST /spaces/{id}/{domain}/intents：执行空间意图，结果以数据返回
//!   （设备级失败不升级为 HTTP 错误）
//! - GET /spaces/{id}/{domain}/state：聚合状态快照
//!
//! 空间不存在统一返回 404 `SPACES.NOT_FOUND`。

use crate::AppState;
use crate::utils::response::{
    history_error, orchestration_error, space_not_found_error, state_error,
};
use api_contract::{ApiResponse, HistoryQuery};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hub_orchestration::{ClimateIntent, CoversIntent, LightingIntent, MediaIntent};

/// 缺省历史窗口：最近 24 小时。
const DEFAULT_HISTORY_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(serde::Deserialize)]
pub struct SpacePath {
    pub space_id: String,
}

/// 执行照明意图
pub async fn post_lighting_intent(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
    Json(intent): Json<LightingIntent>,
) -> Response {
    match state.lighting.execute(&path.space_id, intent).await {
        Ok(Some(result)) => (StatusCode::OK, Json(ApiResponse::success(result))).into_response(),
        Ok(None) => space_not_found_error(),
        Err(err) => orchestration_error(err),
    }
}

/// 照明聚合状态
pub async fn get_lighting_state(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
) -> Response {
    match state.lighting_state.get_state(&path.space_id).await {
        Ok(Some(snapshot)) => {
            (StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response()
        }
        Ok(None) => space_not_found_error(),
        Err(err) => state_error(err),
    }
}

/// 执行温控意图
pub async fn post_climate_intent(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
    Json(intent): Json<ClimateIntent>,
) -> Response {
    match state.climate.execute(&path.space_id, intent).await {
        Ok(Some(result)) => (StatusCode::OK, Json(ApiResponse::success(result))).into_response(),
        Ok(None) => space_not_found_error(),
        Err(err) => orchestration_error(err),
    }
}

/// 温控聚合状态
pub async fn get_climate_state(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
) -> Response {
    match state.climate_state.get_state(&path.space_id).await {
        Ok(Some(snapshot)) => {
            (StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response()
        }
        Ok(None) => space_not_found_error(),
        Err(err) => state_error(err),
    }
}

/// 执行窗帘意图
pub async fn post_covers_intent(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
    Json(intent): Json<CoversIntent>,
) -> Response {
    match state.covers.execute(&path.space_id, intent).await {
        Ok(Some(result)) => (StatusCode::OK, Json(ApiResponse::success(result))).into_response(),
        Ok(None) => space_not_found_error(),
        Err(err) => orchestration_error(err),
    }
}

/// 窗帘聚合状态
pub async fn get_covers_state(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
) -> Response {
    match state.covers_state.get_state(&path.space_id).await {
        Ok(Some(snapshot)) => {
            (StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response()
        }
        Ok(None) => space_not_found_error(),
        Err(err) => state_error(err),
    }
}

/// 执行媒体意图
pub async fn post_media_intent(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
    Json(intent): Json<MediaIntent>,
) -> Response {
    match state.media.execute(&path.space_id, intent).await {
        Ok(Some(result)) => (StatusCode::OK, Json(ApiResponse::success(result))).into_response(),
        Ok(None) => space_not_found_error(),
        Err(err) => orchestration_error(err),
    }
}

/// 媒体聚合状态
pub async fn get_media_state(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
) -> Response {
    match state.media_state.get_state(&path.space_id).await {
        Ok(Some(snapshot)) => {
            (StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response()
        }
        Ok(None) => space_not_found_error(),
        Err(err) => state_error(err),
    }
}

/// 空间意图历史（倒序）
pub async fn get_space_history(
    State(state): State<AppState>,
    Path(path): Path<SpacePath>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    match state.catalog.find_space(&path.space_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return space_not_found_error(),
        Err(err) => return state_error(err.into()),
    }
    let now_ms = now_epoch_ms();
    let from_ms = query.from_ms.unwrap_or(now_ms - DEFAULT_HISTORY_WINDOW_MS);
    let to_ms = query.to_ms.unwrap_or(now_ms);
    match state.history.intent_history(&path.space_id, from_ms, to_ms).await {
        Ok(points) => {
            let data: Vec<serde_json::Value> = points
                .into_iter()
                .map(|point| {
                    serde_json::json!({
                        "intentId": point.intent_id,
                        "intentType": point.intent_type,
                        "status": point.status,
                        "mode": point.mode,
                        "targetsCount": point.targets_count,
                        "successCount": point.success_count,
                        "failedCount": point.failed_count,
                        "tsMs": point.ts_ms,
                    })
                })
                .collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => history_error(err),
    }
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
