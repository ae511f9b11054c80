//! 窗帘域编排器。

use crate::common::{BatchBuilder, Core, partition_offline, target_device_ids};
use crate::intent::{CoversIntent, DEFAULT_POSITION_DELTA};
use crate::selection::select_covers;
use crate::{ExecutionResult, OrchestrationError};
use domain::{CoversMode, PropertyCategory, PropertyValue};
use hub_catalog::SpaceCatalog;
use hub_intents::{IntentRegistry, IntentType};
use hub_platform::{PlatformRegistry, PropertyCommand};
use hub_state::{CoverDevice, StateBus, StateEvent, resolve_covers};
use hub_timeseries::{HistoryStore, spawn_mode_change_write};
use hub_undo::UndoManager;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct CoversOrchestrator {
    core: Core,
}

impl CoversOrchestrator {
    pub fn new(
        catalog: Arc<dyn SpaceCatalog>,
        intents: Arc<IntentRegistry>,
        platforms: Arc<PlatformRegistry>,
        history: Arc<dyn HistoryStore>,
        undo: Arc<UndoManager>,
        bus: StateBus,
    ) -> Self {
        Self {
            core: Core {
                catalog,
                intents,
                platforms,
                history,
                undo,
                bus,
            },
        }
    }

    /// 执行窗帘意图；空间不存在返回 None。
    pub async fn execute(
        &self,
        space_id: &str,
        intent: CoversIntent,
    ) -> Result<Option<ExecutionResult>, OrchestrationError> {
        intent.validate()?;
        if self.core.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let covers = resolve_covers(self.core.catalog.as_ref(), space_id).await?;
        // 窗帘域 fail-closed：不在线一律跳过。
        let (online, offline_ids) =
            partition_offline(covers, |c| c.is_offline(), |c| c.device.id.as_str());

        let (intent_type, value) = match &intent {
            CoversIntent::Open => (IntentType::CoversOpen, json!({})),
            CoversIntent::Close => (IntentType::CoversClose, json!({})),
            CoversIntent::SetPosition { position } => {
                (IntentType::CoversSetPosition, json!({ "position": position }))
            }
            CoversIntent::PositionDelta { delta } => {
                (IntentType::CoversPositionDelta, json!({ "delta": delta }))
            }
            CoversIntent::SetMode { mode } => (IntentType::CoversSetMode, json!({ "mode": mode })),
        };
        let targets = target_device_ids(
            online.iter().map(|c| c.device.id.as_str()),
            &offline_ids,
        );
        let record = self
            .core
            .create_intent(intent_type, space_id, &targets, value);

        if online.is_empty() && !offline_ids.is_empty() {
            return Ok(Some(self.core.finish_all_offline(&record.id, offline_ids)));
        }
        if online.is_empty() {
            let result = self.core.finish(
                &record.id,
                Vec::new(),
                Vec::new(),
                false,
                Some("no covers in space".to_string()),
            );
            return Ok(Some(result));
        }

        self.core
            .capture_snapshot(space_id, intent_type.wire_name())
            .await;

        let batches = plan(&online, &intent);
        let results = self.core.dispatch(batches.into_batches()).await;
        let affected = results
            .iter()
            .filter(|r| r.status == hub_intents::TargetStatus::Success)
            .count() as u32;
        let failed = (results.len() as u32).saturating_sub(affected);
        let result = self
            .core
            .finish(&record.id, results, offline_ids, false, None);

        if result.success {
            if let CoversIntent::SetMode { mode } = &intent {
                spawn_mode_change_write(
                    self.core.history.clone(),
                    space_id.to_string(),
                    "covers.setMode",
                    record.id.clone(),
                    mode_name(*mode).to_string(),
                    targets.len() as u32,
                    affected,
                    failed,
                );
            }
            self.core.bus.publish(StateEvent::Covers {
                space_id: space_id.to_string(),
            });
            info!(
                target: "hub.orchestration",
                %space_id,
                intent_id = %result.intent_id,
                affected = result.affected_devices,
                "covers_intent_executed"
            );
        }
        Ok(Some(result))
    }
}

/// 意图 → 按设备分组的命令批。
fn plan(online: &[CoverDevice], intent: &CoversIntent) -> BatchBuilder {
    let mut batches = BatchBuilder::new();
    match intent {
        CoversIntent::Open => push_positions_or_command(&mut batches, online, 100.0, "open"),
        CoversIntent::Close => push_positions_or_command(&mut batches, online, 0.0, "close"),
        CoversIntent::SetPosition { position } => {
            for cover in online {
                if let Some(prop) = cover.channel.property(PropertyCategory::Position) {
                    batches.push(
                        &cover.device.id,
                        &cover.device.driver,
                        command(cover, &prop.id, PropertyValue::F64(prop.clamp(*position))),
                    );
                }
            }
        }
        CoversIntent::PositionDelta { delta } => {
            let delta = delta.unwrap_or(DEFAULT_POSITION_DELTA);
            for cover in online {
                let Some(prop) = cover.channel.property(PropertyCategory::Position) else {
                    continue;
                };
                let base = prop.number_value().unwrap_or(0.0);
                let next = prop.clamp((base + delta).clamp(0.0, 100.0));
                batches.push(
                    &cover.device.id,
                    &cover.device.driver,
                    command(cover, &prop.id, PropertyValue::F64(next)),
                );
            }
        }
        CoversIntent::SetMode { mode } => {
            let actions = select_covers(online, *mode);
            for (cover, action) in online.iter().zip(actions.iter()) {
                if let Some(prop) = cover.channel.property(PropertyCategory::Position) {
                    batches.push(
                        &cover.device.id,
                        &cover.device.driver,
                        command(
                            cover,
                            &prop.id,
                            PropertyValue::F64(prop.clamp(action.position)),
                        ),
                    );
                }
            }
        }
    }
    batches
}

/// 开/关：优先位置属性；无位置属性的窗帘退回 Command 属性。
fn push_positions_or_command(
    batches: &mut BatchBuilder,
    online: &[CoverDevice],
    position: f64,
    verb: &str,
) {
    for cover in online {
        if let Some(prop) = cover.channel.property(PropertyCategory::Position) {
            batches.push(
                &cover.device.id,
                &cover.device.driver,
                command(cover, &prop.id, PropertyValue::F64(prop.clamp(position))),
            );
        } else if let Some(prop) = cover.channel.property(PropertyCategory::Command) {
            batches.push(
                &cover.device.id,
                &cover.device.driver,
                command(cover, &prop.id, PropertyValue::String(verb.to_string())),
            );
        }
    }
}

fn command(cover: &CoverDevice, property_id: &str, value: PropertyValue) -> PropertyCommand {
    PropertyCommand {
        device_id: cover.device.id.clone(),
        channel_id: cover.channel.id.clone(),
        property_id: property_id.to_string(),
        value,
    }
}

fn mode_name(mode: CoversMode) -> &'static str {
    match mode {
        CoversMode::Open => "open",
        CoversMode::Closed => "closed",
        CoversMode::Privacy => "privacy",
    }
}
