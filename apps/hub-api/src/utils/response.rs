//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数。
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应
//! - 编排的设备级失败以数据返回，只有入参/内部错误才映射为 HTTP 错误

use api_contract::{ApiResponse, MetricsDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hub_orchestration::OrchestrationError;
use hub_state::StateError;
use hub_telemetry::MetricsSnapshot;
use hub_timeseries::HistoryError;

/// 空间未找到错误响应
pub fn space_not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            "SPACES.NOT_FOUND",
            "space not found",
        )),
    )
        .into_response()
}

/// 意图未找到错误响应（非活跃或不存在）
pub fn intent_not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            "INTENTS.NOT_FOUND",
            "intent not found or no longer active",
        )),
    )
        .into_response()
}

/// 撤销不可用错误响应（栈空或已过期）
pub fn undo_not_available_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            "UNDO.NOT_AVAILABLE",
            "nothing to undo",
        )),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message.into())),
    )
        .into_response()
}

/// 编排错误映射：校验失败 → 400，其余 → 500
pub fn orchestration_error(err: OrchestrationError) -> Response {
    match err {
        OrchestrationError::Validation(message) => bad_request_error(message),
        other => internal_error(other.to_string()),
    }
}

/// 状态聚合错误响应
pub fn state_error(err: StateError) -> Response {
    internal_error(err.to_string())
}

/// 历史存储错误映射：非法 id → 400，其余 → 500
pub fn history_error(err: HistoryError) -> Response {
    match err {
        HistoryError::InvalidId(id) => bad_request_error(format!("invalid identifier: {}", id)),
        other => internal_error(other.to_string()),
    }
}

/// MetricsSnapshot 转 MetricsDto
pub fn metrics_to_dto(snapshot: MetricsSnapshot) -> MetricsDto {
    MetricsDto {
        intents_created: snapshot.intents_created,
        intents_completed: snapshot.intents_completed,
        intents_expired: snapshot.intents_expired,
        orchestrations_executed: snapshot.orchestrations_executed,
        devices_commanded: snapshot.devices_commanded,
        devices_failed: snapshot.devices_failed,
        devices_skipped_offline: snapshot.devices_skipped_offline,
        undo_snapshots_pushed: snapshot.undo_snapshots_pushed,
        undo_executed: snapshot.undo_executed,
        history_write_success: snapshot.history_write_success,
        history_write_failure: snapshot.history_write_failure,
    }
}
