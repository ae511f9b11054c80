use crate::now_epoch_ms;
use crate::types::{
    CreateIntentInput, IntentEvent, IntentRecord, IntentStatus, TargetResult, TargetStatus,
};
use hub_telemetry::{record_intent_completed, record_intent_created, record_intent_expired};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// 注册表配置。
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub default_ttl_device_ms: u64,
    pub default_ttl_space_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_ttl_device_ms: 10_000,
            default_ttl_space_ms: 30_000,
            sweep_interval_ms: 500,
        }
    }
}

/// 活跃意图查询过滤器。
#[derive(Debug, Clone, Default)]
pub struct ActiveFilter {
    pub device_id: Option<String>,
    pub space_id: Option<String>,
}

/// 意图注册表：活跃表 + TTL 清理 + 事件。
///
/// 进程启动时构造一次，以句柄传递给所有消费方；
/// 不提供任何全局单例。
pub struct IntentRegistry {
    active: RwLock<HashMap<String, IntentRecord>>,
    events: broadcast::Sender<IntentEvent>,
    config: RegistryConfig,
    sweep_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl IntentRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            active: RwLock::new(HashMap::new()),
            events,
            config,
            sweep_task: Mutex::new(None),
        }
    }

    /// 订阅生命周期事件。
    pub fn subscribe(&self) -> broadcast::Receiver<IntentEvent> {
        self.events.subscribe()
    }

    /// 创建意图：分配 id，缺省 TTL，置 PENDING，发出 Created。
    /// 本操作不会失败（输入由调用方预校验）。
    pub fn create_intent(&self, input: CreateIntentInput) -> IntentRecord {
        let ttl_ms = input.ttl_ms.unwrap_or(if input.intent_type.is_space_command() {
            self.config.default_ttl_space_ms
        } else {
            self.config.default_ttl_device_ms
        });
        let created_at_ms = now_epoch_ms();
        let record = IntentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            intent_type: input.intent_type,
            scope: input.scope,
            targets: input.targets,
            value: input.value,
            status: IntentStatus::Pending,
            ttl_ms,
            created_at_ms,
            expires_at_ms: created_at_ms + ttl_ms as i64,
            completed_at_ms: None,
            results: None,
        };

        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.insert(record.id.clone(), record.clone());
        drop(active);

        record_intent_created();
        info!(
            target: "hub.intents",
            intent_id = %record.id,
            intent_type = record.intent_type.wire_name(),
            target_count = record.targets.len(),
            ttl_ms = ttl_ms,
            "intent_created"
        );
        let _ = self.events.send(IntentEvent::Created {
            intent: record.clone(),
        });
        record
    }

    /// 完成意图：聚合目标结果为终态，发出 Completed，并从活跃表移除。
    ///
    /// 意图不存在（已完成或已过期）时返回 None —— 完成靠移除天然幂等。
    pub fn complete_intent(
        &self,
        intent_id: &str,
        results: Vec<TargetResult>,
    ) -> Option<IntentRecord> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let mut record = active.remove(intent_id)?;
        drop(active);

        let status = aggregate_status(&results);
        let completed_at_ms = now_epoch_ms();
        record.status = status;
        record.completed_at_ms = Some(completed_at_ms);
        record.results = Some(results.clone());

        record_intent_completed();
        info!(
            target: "hub.intents",
            intent_id = %record.id,
            intent_type = record.intent_type.wire_name(),
            status = ?status,
            result_count = results.len(),
            "intent_completed"
        );
        let _ = self.events.send(IntentEvent::Completed {
            intent_id: record.id.clone(),
            status,
            results,
            completed_at_ms,
        });
        Some(record)
    }

    /// 将仍在活跃表中的意图按全目标失败收尾（编排内部异常时使用）。
    pub fn force_fail(&self, intent_id: &str, reason: &str) -> Option<IntentRecord> {
        let targets = {
            let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
            active.get(intent_id)?.targets.clone()
        };
        let results = targets
            .iter()
            .map(|target| TargetResult {
                device_id: target.device_id.clone(),
                status: TargetStatus::Failed,
                error: Some(reason.to_string()),
            })
            .collect();
        self.complete_intent(intent_id, results)
    }

    /// 按 id 查询（仅活跃意图）。
    pub fn get_intent(&self, intent_id: &str) -> Option<IntentRecord> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        active.get(intent_id).cloned()
    }

    /// 查询活跃意图（按设备或空间过滤）。
    pub fn find_active(&self, filter: &ActiveFilter) -> Vec<IntentRecord> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<IntentRecord> = active
            .values()
            .filter(|record| {
                if let Some(device_id) = &filter.device_id {
                    let in_targets = record
                        .targets
                        .iter()
                        .any(|target| &target.device_id == device_id);
                    let in_scope = record
                        .scope
                        .as_ref()
                        .is_some_and(|scope| scope.device_id.as_ref() == Some(device_id));
                    if !in_targets && !in_scope {
                        return false;
                    }
                }
                if let Some(space_id) = &filter.space_id {
                    let matches = record
                        .scope
                        .as_ref()
                        .is_some_and(|scope| scope.space_id.as_ref() == Some(space_id));
                    if !matches {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms));
        records
    }

    /// 活跃（PENDING）意图数量。
    pub fn active_count(&self) -> usize {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        active.len()
    }

    /// 过期清理一轮：移除所有 `expires_at <= now` 的意图并发出 Expired。
    /// 已完成的意图早已移除，不会被标记过期。
    pub fn expire_due(&self, now_ms: i64) -> usize {
        let expired: Vec<IntentRecord> = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            let due: Vec<String> = active
                .values()
                .filter(|record| record.expires_at_ms <= now_ms)
                .map(|record| record.id.clone())
                .collect();
            due.iter().filter_map(|id| active.remove(id)).collect()
        };

        for mut record in expired.iter().cloned() {
            record.status = IntentStatus::Expired;
            record.completed_at_ms = Some(now_ms);
            record_intent_expired();
            debug!(
                target: "hub.intents",
                intent_id = %record.id,
                intent_type = record.intent_type.wire_name(),
                "intent_expired"
            );
            let _ = self.events.send(IntentEvent::Expired {
                intent_id: record.id.clone(),
                status: IntentStatus::Expired,
                completed_at_ms: now_ms,
            });
        }
        expired.len()
    }

    /// 启动后台 TTL 清理任务。
    pub fn start(self: &std::sync::Arc<Self>) {
        let registry = self.clone();
        let interval = Duration::from_millis(self.config.sweep_interval_ms.max(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.expire_due(now_epoch_ms());
            }
        });
        let mut sweep = self
            .sweep_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = sweep.replace(handle) {
            previous.abort();
        }
    }

    /// 停止后台清理任务（关机时调用）。
    pub fn stop(&self) {
        let mut sweep = self
            .sweep_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = sweep.take() {
            handle.abort();
        }
    }
}

impl Drop for IntentRegistry {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 目标结果聚合：全部成功 → SUCCESS；零成功 → FAILED；混合 → PARTIAL。
/// 零目标意图按成功完成。
fn aggregate_status(results: &[TargetResult]) -> IntentStatus {
    if results.is_empty() {
        return IntentStatus::CompletedSuccess;
    }
    let success_count = results
        .iter()
        .filter(|result| result.status == TargetStatus::Success)
        .count();
    if success_count == results.len() {
        IntentStatus::CompletedSuccess
    } else if success_count == 0 {
        IntentStatus::CompletedFailed
    } else {
        IntentStatus::CompletedPartial
    }
}
