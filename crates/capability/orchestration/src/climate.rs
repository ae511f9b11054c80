//! 温控域编排器。

use crate::common::{BatchBuilder, Core, partition_offline, target_device_ids};
use crate::intent::ClimateIntent;
use crate::selection::{climate_power_for_role, thermostat_mode_for_role, thermostat_mode_value};
use crate::{ExecutionResult, OrchestrationError};
use domain::{ClimateMode, PropertyCategory, PropertyValue};
use hub_catalog::SpaceCatalog;
use hub_intents::{IntentRegistry, IntentType};
use hub_platform::{PlatformRegistry, PropertyCommand};
use hub_state::{
    ClimateDevice, ClimateKind, ClimateStateService, SetpointRange, StateBus, StateEvent,
    clamp_setpoint, resolve_climate,
};
use hub_timeseries::{HistoryStore, spawn_mode_change_write};
use hub_undo::UndoManager;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// 每档设定点步长（摄氏度）。
const SETPOINT_STEP: f64 = 0.5;

pub struct ClimateOrchestrator {
    core: Core,
    state: Arc<ClimateStateService>,
}

impl ClimateOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn SpaceCatalog>,
        intents: Arc<IntentRegistry>,
        platforms: Arc<PlatformRegistry>,
        history: Arc<dyn HistoryStore>,
        undo: Arc<UndoManager>,
        bus: StateBus,
        state: Arc<ClimateStateService>,
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
            state,
        }
    }

    /// 执行温控意图；空间不存在返回 None。
    pub async fn execute(
        &self,
        space_id: &str,
        intent: ClimateIntent,
    ) -> Result<Option<ExecutionResult>, OrchestrationError> {
        intent.validate()?;
        if self.core.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let entries = resolve_climate(self.core.catalog.as_ref(), space_id).await?;
        let controllable: Vec<ClimateDevice> = entries
            .into_iter()
            .filter(|e| e.is_controllable())
            .collect();
        // 温控域 fail-closed：不在线一律跳过。
        let (online, offline_ids) =
            partition_offline(controllable, |e| e.is_offline(), |e| e.device.id.as_str());

        let (intent_type, value) = match &intent {
            ClimateIntent::SetMode { mode } => {
                (IntentType::ClimateSetMode, json!({ "mode": mode }))
            }
            ClimateIntent::SetpointSet { setpoint } => (
                IntentType::ClimateSetpointSet,
                json!({ "setpoint": setpoint }),
            ),
            ClimateIntent::SetpointDelta { steps } => {
                (IntentType::ClimateSetpointDelta, json!({ "steps": steps }))
            }
        };
        let targets = target_device_ids(
            online.iter().map(|e| e.device.id.as_str()),
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
                Some("no climate devices in space".to_string()),
            );
            return Ok(Some(result));
        }

        // 意图已进活跃表：此后任何内部错误必须强制收尾，不留 PENDING。
        let range = match self.state.space_setpoint_range(space_id).await {
            Ok(range) => range,
            Err(error) => {
                self.core.intents.force_fail(&record.id, "internal error");
                return Err(error.into());
            }
        };

        self.core
            .capture_snapshot(space_id, intent_type.wire_name())
            .await;

        let batches = plan(&online, &intent, range);
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
            if let ClimateIntent::SetMode { mode } = &intent {
                spawn_mode_change_write(
                    self.core.history.clone(),
                    space_id.to_string(),
                    "climate.setMode",
                    record.id.clone(),
                    thermostat_mode_value(*mode).to_string(),
                    targets.len() as u32,
                    affected,
                    failed,
                );
            }
            self.core.bus.publish(StateEvent::Climate {
                space_id: space_id.to_string(),
            });
            info!(
                target: "hub.orchestration",
                %space_id,
                intent_id = %result.intent_id,
                affected = result.affected_devices,
                "climate_intent_executed"
            );
        }
        Ok(Some(result))
    }
}

/// 意图 → 按设备分组的命令批。
fn plan(online: &[ClimateDevice], intent: &ClimateIntent, range: SetpointRange) -> BatchBuilder {
    let mut batches = BatchBuilder::new();
    match intent {
        ClimateIntent::SetMode { mode } => {
            for entry in online {
                // 单向角色（HeatingOnly/CoolingOnly）收窄设备参与的方向。
                let (heater_on, cooler_on) = climate_power_for_role(*mode, entry.role);
                match entry.kind {
                    ClimateKind::Heater => {
                        push_on(&mut batches, entry, heater_on);
                    }
                    ClimateKind::Cooler => {
                        push_on(&mut batches, entry, cooler_on);
                    }
                    ClimateKind::Thermostat => {
                        if let Some(prop) = entry.channel.property(PropertyCategory::Mode) {
                            batches.push(
                                &entry.device.id,
                                &entry.device.driver,
                                command(
                                    entry,
                                    &prop.id,
                                    PropertyValue::String(
                                        thermostat_mode_for_role(*mode, entry.role).to_string(),
                                    ),
                                ),
                            );
                        }
                        if *mode == ClimateMode::Off {
                            push_on(&mut batches, entry, false);
                        }
                    }
                    ClimateKind::Sensor => {}
                }
            }
        }
        ClimateIntent::SetpointSet { setpoint } => {
            let normalized = clamp_setpoint(*setpoint, range);
            push_setpoints(&mut batches, online, normalized);
        }
        ClimateIntent::SetpointDelta { steps } => {
            let delta = *steps as f64 * SETPOINT_STEP;
            for entry in online {
                let Some(prop) = entry.channel.property(PropertyCategory::Temperature) else {
                    continue;
                };
                let base = prop
                    .number_value()
                    .unwrap_or((range.min + range.max) / 2.0);
                let next = clamp_setpoint(base + delta, range);
                batches.push(
                    &entry.device.id,
                    &entry.device.driver,
                    command(entry, &prop.id, PropertyValue::F64(next)),
                );
            }
        }
    }
    batches
}

fn push_setpoints(batches: &mut BatchBuilder, online: &[ClimateDevice], setpoint: f64) {
    for entry in online {
        let Some(prop) = entry.channel.property(PropertyCategory::Temperature) else {
            continue;
        };
        batches.push(
            &entry.device.id,
            &entry.device.driver,
            command(entry, &prop.id, PropertyValue::F64(setpoint)),
        );
    }
}

fn push_on(batches: &mut BatchBuilder, entry: &ClimateDevice, on: bool) {
    if let Some(prop) = entry.channel.property(PropertyCategory::On) {
        batches.push(
            &entry.device.id,
            &entry.device.driver,
            command(entry, &prop.id, PropertyValue::Bool(on)),
        );
    }
}

fn command(entry: &ClimateDevice, property_id: &str, value: PropertyValue) -> PropertyCommand {
    PropertyCommand {
        device_id: entry.device.id.clone(),
        channel_id: entry.channel.id.clone(),
        property_id: property_id.to_string(),
        value,
    }
}
