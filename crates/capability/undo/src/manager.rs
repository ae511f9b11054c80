//! 有界撤销栈。
//!
//! 每空间一个栈（默认仅保留最新一条），条目带 TTL：
//! 读取路径惰性丢弃过期条目，后台清扫周期性兜底。

use crate::snapshot::SpaceSnapshot;
use hub_telemetry::record_undo_snapshot_pushed;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// 撤销栈配置。
#[derive(Debug, Clone)]
pub struct UndoConfig {
    pub max_entries_per_space: usize,
    pub entry_ttl_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_entries_per_space: 1,
            entry_ttl_ms: 300_000,
            sweep_interval_ms: 60_000,
        }
    }
}

/// 撤销条目。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    pub id: String,
    pub space_id: String,
    /// 触发快照的意图类型线上名称。
    pub trigger: String,
    pub snapshot: SpaceSnapshot,
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
}

/// 撤销栈管理器。
pub struct UndoManager {
    /// space_id -> 条目（索引 0 为最新）。
    stacks: RwLock<HashMap<String, Vec<UndoEntry>>>,
    config: UndoConfig,
    sweep_task: Mutex<Option<JoinHandle<()>>>,
}

impl UndoManager {
    pub fn new(config: UndoConfig) -> Self {
        Self {
            stacks: RwLock::new(HashMap::new()),
            config,
            sweep_task: Mutex::new(None),
        }
    }

    /// 压入快照；超出上限时丢弃最旧条目。
    pub fn push_snapshot(&self, space_id: &str, trigger: &str, snapshot: SpaceSnapshot) -> UndoEntry {
        let now = now_epoch_ms();
        let entry = UndoEntry {
            id: uuid::Uuid::new_v4().to_string(),
            space_id: space_id.to_string(),
            trigger: trigger.to_string(),
            snapshot,
            created_at_ms: now,
            expires_at_ms: now + self.config.entry_ttl_ms as i64,
        };
        let mut stacks = self
            .stacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stack = stacks.entry(space_id.to_string()).or_default();
        stack.insert(0, entry.clone());
        stack.truncate(self.config.max_entries_per_space);
        record_undo_snapshot_pushed();
        debug!(
            target: "hub.undo",
            space_id = %space_id,
            trigger = %trigger,
            "undo_snapshot_pushed"
        );
        entry
    }

    /// 查看最新条目；过期条目惰性丢弃。
    pub fn peek_entry(&self, space_id: &str) -> Option<UndoEntry> {
        let now = now_epoch_ms();
        let mut stacks = self
            .stacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stack = stacks.get_mut(space_id)?;
        stack.retain(|entry| entry.expires_at_ms > now);
        stack.first().cloned()
    }

    /// 取出并消费最新条目。
    pub fn take_entry(&self, space_id: &str) -> Option<UndoEntry> {
        let now = now_epoch_ms();
        let mut stacks = self
            .stacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stack = stacks.get_mut(space_id)?;
        stack.retain(|entry| entry.expires_at_ms > now);
        if stack.is_empty() {
            None
        } else {
            Some(stack.remove(0))
        }
    }

    /// 清理全部过期条目，返回清理数量。
    pub fn cleanup_expired(&self, now_ms: i64) -> usize {
        let mut stacks = self
            .stacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut removed = 0;
        for stack in stacks.values_mut() {
            let before = stack.len();
            stack.retain(|entry| entry.expires_at_ms > now_ms);
            removed += before - stack.len();
        }
        stacks.retain(|_, stack| !stack.is_empty());
        removed
    }

    /// 启动后台清扫。重复调用先停掉旧任务。
    pub fn start(self: &Arc<Self>) {
        self.stop();
        let manager = Arc::clone(self);
        let interval = Duration::from_millis(manager.config.sweep_interval_ms);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let removed = manager.cleanup_expired(now_epoch_ms());
                if removed > 0 {
                    info!(target: "hub.undo", removed, "undo_sweep_removed_expired");
                }
            }
        });
        let mut task = self
            .sweep_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *task = Some(handle);
    }

    /// 停止后台清扫。
    pub fn stop(&self) {
        let mut task = self
            .sweep_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

impl Drop for UndoManager {
    fn drop(&mut self) {
        self.stop();
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
