//! 空间快照捕获。
//!
//! 在任何写操作之前捕获空间当前状态，供撤销回放。
//! 捕获只读目录投影，失败由调用方记日志，绝不影响主流程。

use crate::color::{hsv_to_hex, rgb_to_hex};
use domain::PropertyCategory;
use hub_catalog::{CatalogError, SpaceCatalog};
use hub_state::{resolve_climate, resolve_covers, resolve_lights};
use serde::Serialize;

/// 灯光快照（含恢复所需的属性 id）。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSnapshot {
    pub device_id: String,
    pub channel_id: String,
    pub driver: String,
    pub on: bool,
    pub on_property_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_property_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temperature_property_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgb_property_ids: Option<RgbPropertyIds>,
}

/// RGB 三分量的属性 id（恢复 color_hex 时使用）。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RgbPropertyIds {
    pub red: String,
    pub green: String,
    pub blue: String,
}

/// 主恒温器设定点快照。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateSnapshot {
    pub device_id: String,
    pub channel_id: String,
    pub driver: String,
    pub setpoint: f64,
    pub property_id: String,
}

/// 窗帘位置快照。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverSnapshot {
    pub device_id: String,
    pub channel_id: String,
    pub driver: String,
    pub position: f64,
    pub property_id: String,
}

/// 空间快照。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSnapshot {
    pub lights: Vec<LightSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climate: Option<ClimateSnapshot>,
    pub covers: Vec<CoverSnapshot>,
}

impl SpaceSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty() && self.climate.is_none() && self.covers.is_empty()
    }
}

/// 捕获空间当前状态（跳过离线设备）。
pub async fn capture_space(
    catalog: &dyn SpaceCatalog,
    space_id: &str,
) -> Result<SpaceSnapshot, CatalogError> {
    let lights = resolve_lights(catalog, space_id).await?;
    let light_snapshots = lights
        .iter()
        .filter(|light| !light.is_offline())
        .filter_map(|light| {
            let on_prop = light.channel.property(PropertyCategory::On)?;
            let brightness_prop = light.channel.property(PropertyCategory::Brightness);
            let color_temp_prop = light.channel.property(PropertyCategory::ColorTemperature);
            let (color_hex, rgb_property_ids) = capture_color(light);
            Some(LightSnapshot {
                device_id: light.device.id.clone(),
                channel_id: light.channel.id.clone(),
                driver: light.device.driver.clone(),
                on: on_prop.bool_value().unwrap_or(false),
                on_property_id: on_prop.id.clone(),
                brightness: brightness_prop.and_then(|p| p.number_value()),
                brightness_property_id: brightness_prop.map(|p| p.id.clone()),
                color_temperature: color_temp_prop.and_then(|p| p.number_value()),
                color_temperature_property_id: color_temp_prop.map(|p| p.id.clone()),
                color_hex,
                rgb_property_ids,
            })
        })
        .collect();

    let entries = resolve_climate(catalog, space_id).await?;
    // 主恒温器：可控恒温器按设备名排序取第一个，保证可重复。
    let mut thermostats: Vec<_> = entries
        .iter()
        .filter(|e| !e.is_offline() && e.is_controllable())
        .filter(|e| e.kind == hub_state::ClimateKind::Thermostat)
        .collect();
    thermostats.sort_by(|a, b| a.device.name.cmp(&b.device.name));
    let climate = thermostats.first().and_then(|entry| {
        let prop = entry.channel.property(PropertyCategory::Temperature)?;
        Some(ClimateSnapshot {
            device_id: entry.device.id.clone(),
            channel_id: entry.channel.id.clone(),
            driver: entry.device.driver.clone(),
            setpoint: prop.number_value()?,
            property_id: prop.id.clone(),
        })
    });

    let covers = resolve_covers(catalog, space_id).await?;
    let cover_snapshots = covers
        .iter()
        .filter(|cover| !cover.is_offline())
        .filter_map(|cover| {
            let prop = cover.channel.property(PropertyCategory::Position)?;
            Some(CoverSnapshot {
                device_id: cover.device.id.clone(),
                channel_id: cover.channel.id.clone(),
                driver: cover.device.driver.clone(),
                position: prop.number_value()?,
                property_id: prop.id.clone(),
            })
        })
        .collect();

    Ok(SpaceSnapshot {
        lights: light_snapshots,
        climate,
        covers: cover_snapshots,
    })
}

/// 颜色捕获：RGB 分量优先，缺失时从 Hue/Saturation 换算。
fn capture_color(light: &hub_state::LightDevice) -> (Option<String>, Option<RgbPropertyIds>) {
    let red = light.channel.property(PropertyCategory::ColorRed);
    let green = light.channel.property(PropertyCategory::ColorGreen);
    let blue = light.channel.property(PropertyCategory::ColorBlue);
    if let (Some(red), Some(green), Some(blue)) = (red, green, blue) {
        let ids = RgbPropertyIds {
            red: red.id.clone(),
            green: green.id.clone(),
            blue: blue.id.clone(),
        };
        let hex = match (red.number_value(), green.number_value(), blue.number_value()) {
            (Some(r), Some(g), Some(b)) => Some(rgb_to_hex(
                r.clamp(0.0, 255.0) as u8,
                g.clamp(0.0, 255.0) as u8,
                b.clamp(0.0, 255.0) as u8,
            )),
            _ => None,
        };
        return (hex, Some(ids));
    }

    let hue = light
        .channel
        .property(PropertyCategory::Hue)
        .and_then(|p| p.number_value());
    let saturation = light
        .channel
        .property(PropertyCategory::Saturation)
        .and_then(|p| p.number_value());
    match (hue, saturation) {
        // 无 RGB 属性时 hex 仅供展示，恢复不回写。
        (Some(hue), Some(saturation)) => (Some(hsv_to_hex(hue, saturation, 1.0)), None),
        _ => (None, None),
    }
}
