//! 撤销执行：取出条目并回放恢复命令。

use crate::color::hex_to_rgb;
use crate::manager::{UndoEntry, UndoManager};
use crate::snapshot::{LightSnapshot, SpaceSnapshot};
use domain::PropertyValue;
use hub_platform::{PlatformRegistry, PropertyCommand};
use hub_telemetry::{record_undo_executed, record_devices_commanded, record_devices_failed};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// 撤销执行结果。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoOutcome {
    pub success: bool,
    pub restored_devices: u32,
    pub failed_devices: u32,
    pub entry_id: String,
}

/// 撤销执行器。
pub struct UndoExecutor {
    manager: Arc<UndoManager>,
    platforms: Arc<PlatformRegistry>,
}

impl UndoExecutor {
    pub fn new(manager: Arc<UndoManager>, platforms: Arc<PlatformRegistry>) -> Self {
        Self { manager, platforms }
    }

    /// 执行撤销。无可撤销条目返回 None。
    ///
    /// 条目在执行前即被消费：部分失败不回滚、不重试。
    /// 至少恢复一台设备即视为成功。
    pub async fn execute(&self, space_id: &str) -> Option<UndoOutcome> {
        let entry = self.manager.take_entry(space_id)?;
        let outcome = self.replay(&entry).await;
        record_undo_executed();
        info!(
            target: "hub.undo",
            space_id = %space_id,
            entry_id = %entry.id,
            restored = outcome.restored_devices,
            failed = outcome.failed_devices,
            "undo_executed"
        );
        Some(outcome)
    }

    async fn replay(&self, entry: &UndoEntry) -> UndoOutcome {
        let mut restored = 0u32;
        let mut failed = 0u32;
        for (device_id, (driver, commands)) in restore_commands(&entry.snapshot) {
            let Some(platform) = self.platforms.get_by_driver(&driver) else {
                warn!(
                    target: "hub.undo",
                    device_id = %device_id,
                    driver = %driver,
                    "undo_no_platform_for_driver"
                );
                failed += 1;
                continue;
            };
            match platform.process_batch(&commands).await {
                Ok(true) => restored += 1,
                Ok(false) => failed += 1,
                Err(error) => {
                    warn!(
                        target: "hub.undo",
                        device_id = %device_id,
                        error = %error,
                        "undo_restore_failed"
                    );
                    failed += 1;
                }
            }
        }
        record_devices_commanded(restored as u64);
        record_devices_failed(failed as u64);
        UndoOutcome {
            success: restored > 0,
            restored_devices: restored,
            failed_devices: failed,
            entry_id: entry.id.clone(),
        }
    }
}

/// 快照 → 按设备分组的恢复命令。
fn restore_commands(snapshot: &SpaceSnapshot) -> HashMap<String, (String, Vec<PropertyCommand>)> {
    let mut by_device: HashMap<String, (String, Vec<PropertyCommand>)> = HashMap::new();
    let mut push = |device_id: &str, driver: &str, command: PropertyCommand| {
        by_device
            .entry(device_id.to_string())
            .or_insert_with(|| (driver.to_string(), Vec::new()))
            .1
            .push(command);
    };

    for light in &snapshot.lights {
        for command in light_commands(light) {
            push(&light.device_id, &light.driver, command);
        }
    }
    if let Some(climate) = &snapshot.climate {
        push(
            &climate.device_id,
            &climate.driver,
            PropertyCommand {
                device_id: climate.device_id.clone(),
                channel_id: climate.channel_id.clone(),
                property_id: climate.property_id.clone(),
                value: PropertyValue::F64(climate.setpoint),
            },
        );
    }
    for cover in &snapshot.covers {
        push(
            &cover.device_id,
            &cover.driver,
            PropertyCommand {
                device_id: cover.device_id.clone(),
                channel_id: cover.channel_id.clone(),
                property_id: cover.property_id.clone(),
                value: PropertyValue::F64(cover.position),
            },
        );
    }
    by_device
}

fn light_commands(light: &LightSnapshot) -> Vec<PropertyCommand> {
    let make = |property_id: &str, value: PropertyValue| PropertyCommand {
        device_id: light.device_id.clone(),
        channel_id: light.channel_id.clone(),
        property_id: property_id.to_string(),
        value,
    };

    let mut commands = vec![make(&light.on_property_id, PropertyValue::Bool(light.on))];
    if !light.on {
        return commands;
    }
    if let (Some(brightness), Some(property_id)) =
        (light.brightness, &light.brightness_property_id)
    {
        commands.push(make(property_id, PropertyValue::F64(brightness)));
    }
    if let (Some(color_temperature), Some(property_id)) = (
        light.color_temperature,
        &light.color_temperature_property_id,
    ) {
        commands.push(make(property_id, PropertyValue::F64(color_temperature)));
    }
    if let (Some(hex), Some(ids)) = (&light.color_hex, &light.rgb_property_ids) {
        if let Some((red, green, blue)) = hex_to_rgb(hex) {
            commands.push(make(&ids.red, PropertyValue::I64(red as i64)));
            commands.push(make(&ids.green, PropertyValue::I64(green as i64)));
            commands.push(make(&ids.blue, PropertyValue::I64(blue as i64)));
        }
    }
    commands
}
