//! 历史存储内存实现
//!
//! 用于测试和单机运行。查询路径仍走查询构建器，
//! 保证 UUID 校验与转义在任何实现下都被执行。

use crate::query::last_mode_query;
use crate::{HistoryError, HistoryStore, LastAppliedMode, SpaceIntentPoint};
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::debug;

/// 内存历史存储。
pub struct InMemoryHistoryStore {
    points: RwLock<Vec<SpaceIntentPoint>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            points: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn write_point(&self, point: SpaceIntentPoint) -> Result<(), HistoryError> {
        let mut points = self
            .points
            .write()
            .map_err(|_| HistoryError::Write("lock failed".to_string()))?;
        points.push(point);
        Ok(())
    }

    async fn last_applied_mode(
        &self,
        space_id: &str,
        intent_type: &str,
    ) -> Result<Option<LastAppliedMode>, HistoryError> {
        let query = last_mode_query(space_id, intent_type)?;
        debug!(target: "hub.timeseries", query = %query, "last_mode_query");

        let points = self
            .points
            .read()
            .map_err(|_| HistoryError::Query("lock failed".to_string()))?;
        let found = points
            .iter()
            .filter(|point| {
                point.space_id == space_id
                    && point.intent_type == intent_type
                    && point.mode.as_deref().is_some_and(|mode| !mode.is_empty())
                    && (point.status == "completed_success"
                        || point.status == "completed_partial")
            })
            .max_by_key(|point| point.ts_ms);
        Ok(found.map(|point| LastAppliedMode {
            mode: point.mode.clone().unwrap_or_default(),
            intent_id: point.intent_id.clone(),
            applied_at_ms: point.ts_ms,
            status: point.status.clone(),
        }))
    }

    async fn intent_history(
        &self,
        space_id: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<SpaceIntentPoint>, HistoryError> {
        crate::query::validate_uuid(space_id)?;
        let points = self
            .points
            .read()
            .map_err(|_| HistoryError::Query("lock failed".to_string()))?;
        let mut items: Vec<SpaceIntentPoint> = points
            .iter()
            .filter(|point| {
                point.space_id == space_id && point.ts_ms >= from_ms && point.ts_ms <= to_ms
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.ts_ms.cmp(&a.ts_ms));
        Ok(items)
    }

    async fn delete_space_history(&self, space_id: &str) -> Result<(), HistoryError> {
        let mut points = self
            .points
            .write()
            .map_err(|_| HistoryError::Write("lock failed".to_string()))?;
        points.retain(|point| point.space_id != space_id);
        Ok(())
    }
}
