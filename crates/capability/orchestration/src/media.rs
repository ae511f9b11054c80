//! 媒体域编排器。

use crate::common::{BatchBuilder, Core, partition_offline, target_device_ids};
use crate::intent::MediaIntent;
use crate::selection::select_media;
use crate::{ExecutionResult, OrchestrationError};
use domain::{MediaMode, PropertyCategory, PropertyValue};
use hub_catalog::SpaceCatalog;
use hub_intents::{IntentRegistry, IntentType};
use hub_platform::{PlatformRegistry, PropertyCommand};
use hub_state::{MediaDevice, StateBus, StateEvent, resolve_media};
use hub_timeseries::{HistoryStore, spawn_mode_change_write};
use hub_undo::UndoManager;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct MediaOrchestrator {
    core: Core,
}

impl MediaOrchestrator {
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

    /// 执行媒体意图；空间不存在返回 None。
    pub async fn execute(
        &self,
        space_id: &str,
        intent: MediaIntent,
    ) -> Result<Option<ExecutionResult>, OrchestrationError> {
        intent.validate()?;
        if self.core.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let players = resolve_media(self.core.catalog.as_ref(), space_id).await?;
        // 媒体域 fail-open：仅明确断连算离线。
        let (online, offline_ids) =
            partition_offline(players, |p| p.is_offline(), |p| p.device.id.as_str());

        let (intent_type, value) = match &intent {
            MediaIntent::Power { on } => (IntentType::MediaPower, json!({ "on": on })),
            MediaIntent::VolumeSet { volume } => {
                (IntentType::MediaVolumeSet, json!({ "volume": volume }))
            }
            MediaIntent::Mute { mute } => (IntentType::MediaMute, json!({ "mute": mute })),
            MediaIntent::SetMode { mode } => (IntentType::MediaSetMode, json!({ "mode": mode })),
        };
        let targets = target_device_ids(
            online.iter().map(|p| p.device.id.as_str()),
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
                Some("no media devices in space".to_string()),
            );
            return Ok(Some(result));
        }

        // 媒体不进快照，无捕获步骤。
        let (batches, triggered_fallback) = plan(&online, &intent);
        let results = self.core.dispatch(batches.into_batches()).await;
        let affected = results
            .iter()
            .filter(|r| r.status == hub_intents::TargetStatus::Success)
            .count() as u32;
        let failed = (results.len() as u32).saturating_sub(affected);
        let result =
            self.core
                .finish(&record.id, results, offline_ids, triggered_fallback, None);

        if result.success {
            if let MediaIntent::SetMode { mode } = &intent {
                spawn_mode_change_write(
                    self.core.history.clone(),
                    space_id.to_string(),
                    "media.setMode",
                    record.id.clone(),
                    mode_name(*mode).to_string(),
                    targets.len() as u32,
                    affected,
                    failed,
                );
            }
            self.core.bus.publish(StateEvent::Media {
                space_id: space_id.to_string(),
            });
            info!(
                target: "hub.orchestration",
                %space_id,
                intent_id = %result.intent_id,
                affected = result.affected_devices,
                "media_intent_executed"
            );
        }
        Ok(Some(result))
    }
}

/// 意图 → 按设备分组的命令批。
fn plan(online: &[MediaDevice], intent: &MediaIntent) -> (BatchBuilder, bool) {
    let mut batches = BatchBuilder::new();
    let mut triggered_fallback = false;
    match intent {
        MediaIntent::Power { on } => {
            for player in online {
                if let Some(prop) = player.channel.property(PropertyCategory::On) {
                    batches.push(
                        &player.device.id,
                        &player.device.driver,
                        command(player, &prop.id, PropertyValue::Bool(*on)),
                    );
                }
            }
        }
        MediaIntent::VolumeSet { volume } => {
            for player in online {
                if let Some(prop) = player.channel.property(PropertyCategory::Volume) {
                    batches.push(
                        &player.device.id,
                        &player.device.driver,
                        command(player, &prop.id, PropertyValue::F64(prop.clamp(*volume))),
                    );
                }
            }
        }
        MediaIntent::Mute { mute } => {
            for player in online {
                if let Some(prop) = player.channel.property(PropertyCategory::Mute) {
                    batches.push(
                        &player.device.id,
                        &player.device.driver,
                        command(player, &prop.id, PropertyValue::Bool(*mute)),
                    );
                }
            }
        }
        MediaIntent::SetMode { mode } => {
            let (actions, fallback) = select_media(online, *mode);
            triggered_fallback = fallback;
            for (player, action) in online.iter().zip(actions.iter()) {
                let Some(on_prop) = player.channel.property(PropertyCategory::On) else {
                    continue;
                };
                batches.push(
                    &player.device.id,
                    &player.device.driver,
                    command(player, &on_prop.id, PropertyValue::Bool(action.on)),
                );
                if action.on {
                    if let (Some(volume), Some(prop)) = (
                        action.volume,
                        player.channel.property(PropertyCategory::Volume),
                    ) {
                        batches.push(
                            &player.device.id,
                            &player.device.driver,
                            command(player, &prop.id, PropertyValue::F64(prop.clamp(volume))),
                        );
                    }
                }
            }
        }
    }
    (batches, triggered_fallback)
}

fn command(player: &MediaDevice, property_id: &str, value: PropertyValue) -> PropertyCommand {
    PropertyCommand {
        device_id: player.device.id.clone(),
        channel_id: player.channel.id.clone(),
        property_id: property_id.to_string(),
        value,
    }
}

fn mode_name(mode: MediaMode) -> &'static str {
    match mode {
        MediaMode::Party => "party",
        MediaMode::Background => "background",
        MediaMode::Quiet => "quiet",
    }
}
