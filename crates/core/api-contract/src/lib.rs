//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 活跃意图查询参数。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveIntentsQuery {
    pub device_id: Option<String>,
    pub space_id: Option<String>,
}

/// 意图历史查询参数（epoch 毫秒，缺省最近 24 小时）。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

/// 指标返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDto {
    pub intents_created: u64,
    pub intents_completed: u64,
    pub intents_expired: u64,
    pub orchestrations_executed: u64,
    pub devices_commanded: u64,
    pub devices_failed: u64,
    pub devices_skipped_offline: u64,
    pub undo_snapshots_pushed: u64,
    pub undo_executed: u64,
    pub history_write_success: u64,
    pub history_write_failure: u64,
}

/// 撤销可用性返回结构（peek 接口）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoAvailabilityDto<T> {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let response = ApiResponse::success(42);
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], 42);
        assert!(value["error"].is_null());
    }

    #[test]
    fn error_envelope_carries_code_and_message() {
        let response = ApiResponse::<()>::error("SPACES.NOT_FOUND", "space not found");
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "SPACES.NOT_FOUND");
        assert_eq!(value["error"]["message"], "space not found");
    }

    #[test]
    fn intents_query_accepts_camel_case_keys() {
        let query: ActiveIntentsQuery =
            serde_json::from_str(r#"{"deviceId":"d1","spaceId":"s1"}"#).expect("parse");
        assert_eq!(query.device_id.as_deref(), Some("d1"));
        assert_eq!(query.space_id.as_deref(), Some("s1"));
    }
}
