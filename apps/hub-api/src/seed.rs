//! 演示空间注入（HUB_SEED_DEMO=1）
//!
//! 注入一个带全部四个域设备的客厅，方便零依赖手动试跑：
//! 驱动一律为 `demo`（NoopPlatform），命令下发总是成功。

use domain::{
    ChannelCategory, ChannelView, ConnectionState, CoversRole, DeviceCategory, DeviceView,
    LightingRole, MediaRole, PropertyCategory, PropertyValue, PropertyView, Space,
};
use hub_catalog::{CatalogError, InMemoryCatalog, RoleAssignment};

/// 演示空间 id（历史查询要求 UUID）。
pub const DEMO_SPACE_ID: &str = "3f2c9a50-77f2-4d2e-8f55-0a1b2c3d4e5f";

pub fn seed_demo(catalog: &InMemoryCatalog) -> Result<(), CatalogError> {
    catalog.upsert_space(Space::new(DEMO_SPACE_ID, "Demo Living Room"))?;

    catalog.upsert_device(DEMO_SPACE_ID, light("demo-light-main", true, 80.0))?;
    catalog.upsert_device(DEMO_SPACE_ID, light("demo-light-ambient", true, 60.0))?;
    catalog.assign_lighting_role(RoleAssignment {
        space_id: DEMO_SPACE_ID.to_string(),
        device_id: "demo-light-main".to_string(),
        channel_id: "light".to_string(),
        role: LightingRole::Main,
        priority: 0,
    })?;
    catalog.assign_lighting_role(RoleAssignment {
        space_id: DEMO_SPACE_ID.to_string(),
        device_id: "demo-light-ambient".to_string(),
        channel_id: "light".to_string(),
        role: LightingRole::Ambient,
        priority: 0,
    })?;

    catalog.upsert_device(DEMO_SPACE_ID, thermostat("demo-thermostat", 21.0))?;
    catalog.upsert_device(DEMO_SPACE_ID, temperature_sensor("demo-sensor", 21.4))?;

    catalog.upsert_device(DEMO_SPACE_ID, cover("demo-cover", 100.0))?;
    catalog.assign_covers_role(RoleAssignment {
        space_id: DEMO_SPACE_ID.to_string(),
        device_id: "demo-cover".to_string(),
        channel_id: "cover".to_string(),
        role: CoversRole::Primary,
        priority: 0,
    })?;

    catalog.upsert_device(DEMO_SPACE_ID, speaker("demo-speaker", false, 30.0))?;
    catalog.assign_media_role(RoleAssignment {
        space_id: DEMO_SPACE_ID.to_string(),
        device_id: "demo-speaker".to_string(),
        channel_id: "playback".to_string(),
        role: MediaRole::Primary,
        priority: 0,
    })?;

    Ok(())
}

fn device(id: &str, name: &str, category: DeviceCategory, channel: ChannelView) -> DeviceView {
    DeviceView {
        id: id.to_string(),
        name: name.to_string(),
        driver: "demo".to_string(),
        category,
        online: true,
        connection: ConnectionState::Connected,
        channels: vec![channel],
    }
}

fn light(id: &str, on: bool, brightness: f64) -> DeviceView {
    let mut on_prop = PropertyView::new("on", PropertyCategory::On);
    on_prop.value = Some(PropertyValue::Bool(on));
    let mut brightness_prop = PropertyView::new("brightness", PropertyCategory::Brightness);
    brightness_prop.value = Some(PropertyValue::F64(brightness));
    brightness_prop.min = Some(0.0);
    brightness_prop.max = Some(100.0);
    device(
        id,
        "Demo Light",
        DeviceCategory::Lighting,
        ChannelView {
            id: "light".to_string(),
            category: ChannelCategory::Light,
            properties: vec![on_prop, brightness_prop],
        },
    )
}

fn thermostat(id: &str, setpoint: f64) -> DeviceView {
    let mut mode = PropertyView::new("mode", PropertyCategory::Mode);
    mode.value = Some(PropertyValue::String("off".to_string()));
    let mut temp = PropertyView::new("setpoint", PropertyCategory::Temperature);
    temp.value = Some(PropertyValue::F64(setpoint));
    temp.min = Some(10.0);
    temp.max = Some(30.0);
    device(
        id,
        "Demo Thermostat",
        DeviceCategory::Thermostat,
        ChannelView {
            id: "thermostat".to_string(),
            category: ChannelCategory::Thermostat,
            properties: vec![mode, temp],
        },
    )
}

fn temperature_sensor(id: &str, reading: f64) -> DeviceView {
    let mut temp = PropertyView::new("temperature", PropertyCategory::Temperature);
    temp.value = Some(PropertyValue::F64(reading));
    device(
        id,
        "Demo Sensor",
        DeviceCategory::Sensor,
        ChannelView {
            id: "sensor".to_string(),
            category: ChannelCategory::Temperature,
            properties: vec![temp],
        },
    )
}

fn cover(id: &str, position: f64) -> DeviceView {
    let mut prop = PropertyView::new("position", PropertyCategory::Position);
    prop.value = Some(PropertyValue::F64(position));
    prop.min = Some(0.0);
    prop.max = Some(100.0);
    device(
        id,
        "Demo Cover",
        DeviceCategory::WindowCovering,
        ChannelView {
            id: "cover".to_string(),
            category: ChannelCategory::WindowCovering,
            properties: vec![prop],
        },
    )
}

fn speaker(id: &str, on: bool, volume: f64) -> DeviceView {
    let mut on_prop = PropertyView::new("on", PropertyCategory::On);
    on_prop.value = Some(PropertyValue::Bool(on));
    let mut volume_prop = PropertyView::new("volume", PropertyCategory::Volume);
    volume_prop.value = Some(PropertyValue::F64(volume));
    volume_prop.min = Some(0.0);
    volume_prop.max = Some(100.0);
    device(
        id,
        "Demo Speaker",
        DeviceCategory::Media,
        ChannelView {
            id: "playback".to_string(),
            category: ChannelCategory::MediaPlayback,
            properties: vec![on_prop, volume_prop],
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_catalog::SpaceCatalog;

    #[tokio::test]
    async fn seeded_space_has_all_domains() {
        let catalog = InMemoryCatalog::new();
        seed_demo(&catalog).expect("seed");
        let space = catalog
            .find_space(DEMO_SPACE_ID)
            .await
            .expect("find")
            .expect("space");
        assert_eq!(space.name, "Demo Living Room");
        let devices = catalog.devices_in_space(DEMO_SPACE_ID).await.expect("devices");
        assert_eq!(devices.len(), 6);
    }
}
