//! # 意图历史存储
//!
//! 编排完成后把空间级意图落入时序存储（measurement `space_intent`），
//! 并支持"最近一次应用的模式"查询，用于状态聚合的模式平局裁决。
//!
//! 写入一律 fire-and-forget：历史存储慢或失败绝不阻塞、
//! 也绝不影响编排主流程的结果。
//!
//! 任何拼入查询的字符串必须先校验（空间 id 必须是 UUID）
//! 并转义（反斜杠在前、引号在后）—— 这是必须保留的纵深防御边界。

mod in_memory;
mod query;

pub use in_memory::InMemoryHistoryStore;
pub use query::{escape_quoted, last_mode_query, validate_uuid};

use async_trait::async_trait;
use hub_telemetry::{record_history_write_failure, record_history_write_success};
use std::sync::Arc;
use tracing::{debug, warn};

/// 历史存储错误。
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error("write error: {0}")]
    Write(String),
    #[error("query error: {0}")]
    Query(String),
}

/// `space_intent` 数据点。
/// tag：spaceId/intentType/status；field：其余。
#[derive(Debug, Clone)]
pub struct SpaceIntentPoint {
    pub space_id: String,
    pub intent_type: String,
    pub status: String,
    pub intent_id: String,
    pub mode: Option<String>,
    pub targets_count: u32,
    pub success_count: u32,
    pub failed_count: u32,
    pub ts_ms: i64,
}

/// 最近一次应用的模式。
#[derive(Debug, Clone)]
pub struct LastAppliedMode {
    pub mode: String,
    pub intent_id: String,
    pub applied_at_ms: i64,
    pub status: String,
}

/// 历史存储接口。
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn write_point(&self, point: SpaceIntentPoint) -> Result<(), HistoryError>;

    /// 指定意图类型最近一次成功/部分成功且带模式的记录。
    async fn last_applied_mode(
        &self,
        space_id: &str,
        intent_type: &str,
    ) -> Result<Option<LastAppliedMode>, HistoryError>;

    /// 时间范围内的意图历史（倒序）。
    async fn intent_history(
        &self,
        space_id: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<SpaceIntentPoint>, HistoryError>;

    async fn delete_space_history(&self, space_id: &str) -> Result<(), HistoryError>;
}

/// 异步落库一次模式变更（fire-and-forget）。
///
/// 零成功目标不落库；状态按 failed 数派生。
pub fn spawn_mode_change_write(
    store: Arc<dyn HistoryStore>,
    space_id: String,
    intent_type: &'static str,
    intent_id: String,
    mode: String,
    targets_count: u32,
    success_count: u32,
    failed_count: u32,
) {
    if success_count == 0 {
        debug!(
            target: "hub.timeseries",
            space_id = %space_id,
            intent_type = intent_type,
            "mode_change_skipped_no_success"
        );
        return;
    }
    let status = if failed_count == 0 {
        "completed_success"
    } else {
        "completed_partial"
    };
    tokio::spawn(async move {
        let point = SpaceIntentPoint {
            space_id: space_id.clone(),
            intent_type: intent_type.to_string(),
            status: status.to_string(),
            intent_id,
            mode: Some(mode),
            targets_count,
            success_count,
            failed_count,
            ts_ms: now_epoch_ms(),
        };
        match store.write_point(point).await {
            Ok(()) => record_history_write_success(),
            Err(err) => {
                record_history_write_failure();
                warn!(
                    target: "hub.timeseries",
                    space_id = %space_id,
                    intent_type = intent_type,
                    error = %err,
                    "mode_change_write_failed"
                );
            }
        }
    });
}

fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
