//! 四个域编排器共用的执行骨架。

use crate::ExecutionResult;
use hub_catalog::SpaceCatalog;
use hub_intents::{
    CreateIntentInput, IntentRecord, IntentRegistry, IntentScope, IntentTarget, IntentType,
    TargetResult, TargetStatus,
};
use hub_platform::{PlatformRegistry, PropertyCommand};
use hub_state::StateBus;
use hub_telemetry::{
    record_devices_commanded, record_devices_failed, record_devices_skipped_offline,
    record_orchestration_executed,
};
use hub_timeseries::HistoryStore;
use hub_undo::{UndoManager, capture_space};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// 离线目标的统一错误文案。
pub(crate) const OFFLINE_MESSAGE: &str = "Device offline";
/// 无平台驱动的统一错误文案。
pub(crate) const UNSUPPORTED_MESSAGE: &str = "unsupported device type";
/// 下发失败的统一错误文案。
pub(crate) const EXECUTION_FAILED_MESSAGE: &str = "execution failed";

/// 编排器共享句柄。
#[derive(Clone)]
pub(crate) struct Core {
    pub catalog: Arc<dyn SpaceCatalog>,
    pub intents: Arc<IntentRegistry>,
    pub platforms: Arc<PlatformRegistry>,
    pub history: Arc<dyn HistoryStore>,
    pub undo: Arc<UndoManager>,
    pub bus: StateBus,
}

impl Core {
    /// 创建空间级意图（目标为去重后的设备 id 列表）。
    pub fn create_intent(
        &self,
        intent_type: IntentType,
        space_id: &str,
        device_ids: &[String],
        value: serde_json::Value,
    ) -> IntentRecord {
        let targets = device_ids
            .iter()
            .map(|device_id| IntentTarget {
                device_id: device_id.clone(),
                channel_id: None,
                property_id: None,
            })
            .collect();
        self.intents.create_intent(CreateIntentInput {
            intent_type,
            targets,
            value,
            scope: Some(IntentScope {
                space_id: Some(space_id.to_string()),
                device_id: None,
                role: None,
            }),
            ttl_ms: None,
        })
    }

    /// 写前捕获撤销快照。失败只记日志，绝不影响主流程。
    pub async fn capture_snapshot(&self, space_id: &str, trigger: &str) {
        match capture_space(self.catalog.as_ref(), space_id).await {
            Ok(snapshot) if snapshot.is_empty() => {
                debug!(target: "hub.orchestration", %space_id, "snapshot_empty_not_pushed");
            }
            Ok(snapshot) => {
                self.undo.push_snapshot(space_id, trigger, snapshot);
            }
            Err(error) => {
                warn!(
                    target: "hub.orchestration",
                    %space_id,
                    %error,
                    "snapshot_capture_failed"
                );
            }
        }
    }

    /// 按设备批量下发。平台边界只有整批成败，没有单条反馈。
    pub async fn dispatch(&self, batches: Vec<DeviceBatch>) -> Vec<TargetResult> {
        let mut results = Vec::with_capacity(batches.len());
        for batch in batches {
            let status = match self.platforms.get_by_driver(&batch.driver) {
                None => TargetResult {
                    device_id: batch.device_id.clone(),
                    status: TargetStatus::Failed,
                    error: Some(UNSUPPORTED_MESSAGE.to_string()),
                },
                Some(platform) => match platform.process_batch(&batch.commands).await {
                    Ok(true) => TargetResult {
                        device_id: batch.device_id.clone(),
                        status: TargetStatus::Success,
                        error: None,
                    },
                    Ok(false) => TargetResult {
                        device_id: batch.device_id.clone(),
                        status: TargetStatus::Failed,
                        error: Some(EXECUTION_FAILED_MESSAGE.to_string()),
                    },
                    Err(error) => {
                        warn!(
                            target: "hub.orchestration",
                            device_id = %batch.device_id,
                            %error,
                            "device_batch_failed"
                        );
                        TargetResult {
                            device_id: batch.device_id.clone(),
                            status: TargetStatus::Failed,
                            error: Some(EXECUTION_FAILED_MESSAGE.to_string()),
                        }
                    }
                },
            };
            results.push(status);
        }
        results
    }

    /// 收尾：补上离线 SKIPPED、完成意图、累计指标、套用成功判定。
    pub fn finish(
        &self,
        intent_id: &str,
        mut results: Vec<TargetResult>,
        offline_device_ids: Vec<String>,
        triggered_fallback: bool,
        message: Option<String>,
    ) -> ExecutionResult {
        for device_id in &offline_device_ids {
            results.push(TargetResult {
                device_id: device_id.clone(),
                status: TargetStatus::Skipped,
                error: Some(OFFLINE_MESSAGE.to_string()),
            });
        }
        let affected = results
            .iter()
            .filter(|r| r.status == TargetStatus::Success)
            .count() as u32;
        let failed = results
            .iter()
            .filter(|r| matches!(r.status, TargetStatus::Failed | TargetStatus::Timeout))
            .count() as u32;

        self.intents.complete_intent(intent_id, results);
        record_orchestration_executed();
        record_devices_commanded(affected as u64);
        record_devices_failed(failed as u64);
        record_devices_skipped_offline(offline_device_ids.len() as u64);

        ExecutionResult::from_counts(
            intent_id.to_string(),
            affected,
            failed,
            offline_device_ids,
            triggered_fallback,
            message,
        )
    }

    /// 全员离线的短路收尾：不下发、意图整体 SKIPPED、结果判失败。
    pub fn finish_all_offline(
        &self,
        intent_id: &str,
        offline_device_ids: Vec<String>,
    ) -> ExecutionResult {
        let mut result = self.finish(
            intent_id,
            Vec::new(),
            offline_device_ids,
            false,
            Some(OFFLINE_MESSAGE.to_string()),
        );
        result.success = false;
        result
    }
}

/// 单设备命令批。
#[derive(Debug, Clone)]
pub(crate) struct DeviceBatch {
    pub device_id: String,
    pub driver: String,
    pub commands: Vec<PropertyCommand>,
}

/// 按设备聚合命令（BTreeMap 保证下发顺序可重复）。
#[derive(Debug, Default)]
pub(crate) struct BatchBuilder {
    batches: BTreeMap<String, DeviceBatch>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, device_id: &str, driver: &str, command: PropertyCommand) {
        self.batches
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceBatch {
                device_id: device_id.to_string(),
                driver: driver.to_string(),
                commands: Vec::new(),
            })
            .commands
            .push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn into_batches(self) -> Vec<DeviceBatch> {
        self.batches.into_values().collect()
    }
}

/// 离线分区：在线通道保留，离线设备 id 去重后排序返回。
pub(crate) fn partition_offline<T>(
    items: Vec<T>,
    is_offline: impl Fn(&T) -> bool,
    device_id: impl Fn(&T) -> &str,
) -> (Vec<T>, Vec<String>) {
    let mut online = Vec::new();
    let mut offline: BTreeSet<String> = BTreeSet::new();
    for item in items {
        if is_offline(&item) {
            offline.insert(device_id(&item).to_string());
        } else {
            online.push(item);
        }
    }
    (online, offline.into_iter().collect())
}

/// 在线通道 + 离线设备 → 去重后的意图目标设备 id 列表。
pub(crate) fn target_device_ids<'a>(
    online_ids: impl Iterator<Item = &'a str>,
    offline_ids: &[String],
) -> Vec<String> {
    let mut ids: BTreeSet<String> = online_ids.map(|id| id.to_string()).collect();
    ids.extend(offline_ids.iter().cloned());
    ids.into_iter().collect()
}
