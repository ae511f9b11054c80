//! 照明域编排器。

use crate::common::{BatchBuilder, Core, partition_offline, target_device_ids};
use crate::intent::LightingIntent;
use crate::selection::select_lighting;
use crate::{ExecutionResult, OrchestrationError};
use domain::{LightingMode, PropertyCategory, PropertyValue};
use hub_catalog::SpaceCatalog;
use hub_intents::{IntentRegistry, IntentType};
use hub_platform::{PlatformRegistry, PropertyCommand};
use hub_state::{LightDevice, StateBus, StateEvent, resolve_lights};
use hub_timeseries::{HistoryStore, spawn_mode_change_write};
use hub_undo::UndoManager;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct LightingOrchestrator {
    core: Core,
}

impl LightingOrchestrator {
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

    /// 执行照明意图；空间不存在返回 None。
    pub async fn execute(
        &self,
        space_id: &str,
        intent: LightingIntent,
    ) -> Result<Option<ExecutionResult>, OrchestrationError> {
        intent.validate()?;
        if self.core.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let lights = resolve_lights(self.core.catalog.as_ref(), space_id).await?;
        // 照明域 fail-open：仅明确断连算离线。
        let (online, offline_ids) =
            partition_offline(lights, |l| l.is_offline(), |l| l.device.id.as_str());

        let (intent_type, value) = match &intent {
            LightingIntent::SetMode { mode } => {
                (IntentType::LightingSetMode, json!({ "mode": mode }))
            }
            LightingIntent::Toggle { on } => (IntentType::LightToggle, json!({ "on": on })),
            LightingIntent::SetBrightness { brightness } => (
                IntentType::LightSetBrightness,
                json!({ "brightness": brightness }),
            ),
            LightingIntent::BrightnessDelta { delta } => (
                IntentType::LightingBrightnessDelta,
                json!({ "delta": delta }),
            ),
        };
        let targets = target_device_ids(
            online.iter().map(|l| l.device.id.as_str()),
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
                Some("no lights in space".to_string()),
            );
            return Ok(Some(result));
        }

        self.core
            .capture_snapshot(space_id, intent_type.wire_name())
            .await;

        let (batches, triggered_fallback, message) = plan(&online, &intent);
        let results = self.core.dispatch(batches.into_batches()).await;
        let affected = results
            .iter()
            .filter(|r| r.status == hub_intents::TargetStatus::Success)
            .count() as u32;
        let failed = (results.len() as u32).saturating_sub(affected);
        let result = self
            .core
            .finish(&record.id, results, offline_ids, triggered_fallback, message);

        if result.success {
            if let LightingIntent::SetMode { mode } = &intent {
                spawn_mode_change_write(
                    self.core.history.clone(),
                    space_id.to_string(),
                    "lighting.setMode",
                    record.id.clone(),
                    mode_name(*mode).to_string(),
                    targets.len() as u32,
                    affected,
                    failed,
                );
            }
            self.core.bus.publish(StateEvent::Lighting {
                space_id: space_id.to_string(),
            });
            info!(
                target: "hub.orchestration",
                %space_id,
                intent_id = %result.intent_id,
                affected = result.affected_devices,
                "lighting_intent_executed"
            );
        }
        Ok(Some(result))
    }
}

/// 意图 → 按设备分组的命令批。
fn plan(
    online: &[LightDevice],
    intent: &LightingIntent,
) -> (BatchBuilder, bool, Option<String>) {
    let mut batches = BatchBuilder::new();
    let mut triggered_fallback = false;
    let mut message = None;

    match intent {
        LightingIntent::SetMode { mode } => {
            let (actions, fallback) = select_lighting(online, *mode);
            triggered_fallback = fallback;
            for (light, action) in online.iter().zip(actions.iter()) {
                let Some(on_prop) = light.channel.property(PropertyCategory::On) else {
                    continue;
                };
                batches.push(
                    &light.device.id,
                    &light.device.driver,
                    command(light, &on_prop.id, PropertyValue::Bool(action.on)),
                );
                if action.on {
                    if let (Some(brightness), Some(prop)) = (
                        action.brightness,
                        light.channel.property(PropertyCategory::Brightness),
                    ) {
                        batches.push(
                            &light.device.id,
                            &light.device.driver,
                            command(light, &prop.id, PropertyValue::F64(prop.clamp(brightness))),
                        );
                    }
                }
            }
        }
        LightingIntent::Toggle { on } => {
            for light in online {
                let Some(on_prop) = light.channel.property(PropertyCategory::On) else {
                    continue;
                };
                batches.push(
                    &light.device.id,
                    &light.device.driver,
                    command(light, &on_prop.id, PropertyValue::Bool(*on)),
                );
            }
        }
        LightingIntent::SetBrightness { brightness } => {
            for light in online {
                let Some(on_prop) = light.channel.property(PropertyCategory::On) else {
                    continue;
                };
                batches.push(
                    &light.device.id,
                    &light.device.driver,
                    command(light, &on_prop.id, PropertyValue::Bool(true)),
                );
                if let Some(prop) = light.channel.property(PropertyCategory::Brightness) {
                    batches.push(
                        &light.device.id,
                        &light.device.driver,
                        command(light, &prop.id, PropertyValue::F64(prop.clamp(*brightness))),
                    );
                }
            }
        }
        LightingIntent::BrightnessDelta { delta } => {
            // 只调当前点亮的灯；无亮度读数时按基准 50 起步。
            let mut adjusted = 0;
            for light in online {
                let on = light
                    .channel
                    .property(PropertyCategory::On)
                    .and_then(|p| p.bool_value())
                    .unwrap_or(false);
                if !on {
                    continue;
                }
                let Some(prop) = light.channel.property(PropertyCategory::Brightness) else {
                    continue;
                };
                let base = prop.number_value().unwrap_or(50.0);
                let next = prop.clamp((base + delta).clamp(0.0, 100.0));
                batches.push(
                    &light.device.id,
                    &light.device.driver,
                    command(light, &prop.id, PropertyValue::F64(next)),
                );
                adjusted += 1;
            }
            if adjusted == 0 {
                message = Some("no lights currently on".to_string());
            }
        }
    }
    (batches, triggered_fallback, message)
}

fn command(light: &LightDevice, property_id: &str, value: PropertyValue) -> PropertyCommand {
    PropertyCommand {
        device_id: light.device.id.clone(),
        channel_id: light.channel.id.clone(),
        property_id: property_id.to_string(),
        value,
    }
}

fn mode_name(mode: LightingMode) -> &'static str {
    match mode {
        LightingMode::Work => "work",
        LightingMode::Relax => "relax",
        LightingMode::Night => "night",
    }
}
