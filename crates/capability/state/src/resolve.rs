//! 目录投影 → 各域设备视图。
//!
//! 每个域的视图把设备、通道、角色装配在一起，并统一排除
//! `Hidden` 角色。离线判定分两种语义：
//!
//! - **fail-open**（照明/媒体）：仅当明确断连才算离线，
//!   连接状态未知的设备仍尝试下发；
//! - **fail-closed**（温控/窗帘）：只要不在线即算离线，
//!   宁可跳过也不对执行器盲发命令。

use domain::{
    ChannelCategory, ChannelView, ClimateRole, ConnectionState, CoversRole, DeviceView,
    LightingRole, MediaRole,
};
use hub_catalog::{CatalogError, SpaceCatalog, role_key};

/// fail-open 离线判定：明确断连才算离线。
pub fn offline_fail_open(device: &DeviceView) -> bool {
    !device.online && device.connection == ConnectionState::Disconnected
}

/// fail-closed 离线判定：不在线即离线。
pub fn offline_fail_closed(device: &DeviceView) -> bool {
    !device.online
}

/// 照明域设备视图（一个灯光通道一条记录）。
#[derive(Debug, Clone)]
pub struct LightDevice {
    pub device: DeviceView,
    pub channel: ChannelView,
    pub role: Option<LightingRole>,
}

impl LightDevice {
    pub fn key(&self) -> String {
        role_key(&self.device.id, &self.channel.id)
    }

    pub fn is_offline(&self) -> bool {
        offline_fail_open(&self.device)
    }
}

/// 温控设备的功能类型（由通道类别派生）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateKind {
    Heater,
    Cooler,
    Thermostat,
    /// 只读温度源，不接收命令。
    Sensor,
}

/// 温控域设备视图。
#[derive(Debug, Clone)]
pub struct ClimateDevice {
    pub device: DeviceView,
    pub channel: ChannelView,
    pub kind: ClimateKind,
    pub role: Option<ClimateRole>,
}

impl ClimateDevice {
    pub fn key(&self) -> String {
        role_key(&self.device.id, &self.channel.id)
    }

    pub fn is_offline(&self) -> bool {
        offline_fail_closed(&self.device)
    }

    /// 可接收命令：排除温度传感器通道与 Sensor 角色。
    pub fn is_controllable(&self) -> bool {
        self.kind != ClimateKind::Sensor && self.role != Some(ClimateRole::Sensor)
    }
}

/// 窗帘域设备视图。
#[derive(Debug, Clone)]
pub struct CoverDevice {
    pub device: DeviceView,
    pub channel: ChannelView,
    pub role: Option<CoversRole>,
}

impl CoverDevice {
    pub fn key(&self) -> String {
        role_key(&self.device.id, &self.channel.id)
    }

    pub fn is_offline(&self) -> bool {
        offline_fail_closed(&self.device)
    }
}

/// 媒体域设备视图。
#[derive(Debug, Clone)]
pub struct MediaDevice {
    pub device: DeviceView,
    pub channel: ChannelView,
    pub role: Option<MediaRole>,
}

impl MediaDevice {
    pub fn key(&self) -> String {
        role_key(&self.device.id, &self.channel.id)
    }

    pub fn is_offline(&self) -> bool {
        offline_fail_open(&self.device)
    }
}

/// 解析空间内全部灯光通道（排除 Hidden 角色）。
pub async fn resolve_lights(
    catalog: &dyn SpaceCatalog,
    space_id: &str,
) -> Result<Vec<LightDevice>, CatalogError> {
    let devices = catalog.devices_in_space(space_id).await?;
    let roles = catalog.lighting_roles(space_id).await?;
    let mut lights = Vec::new();
    for device in &devices {
        for channel in device.channels_of(ChannelCategory::Light) {
            let role = roles.get(&role_key(&device.id, &channel.id)).copied();
            if role == Some(LightingRole::Hidden) {
                continue;
            }
            lights.push(LightDevice {
                device: device.clone(),
                channel: channel.clone(),
                role,
            });
        }
    }
    Ok(lights)
}

fn climate_kind(category: ChannelCategory) -> Option<ClimateKind> {
    match category {
        ChannelCategory::Heater => Some(ClimateKind::Heater),
        ChannelCategory::Cooler => Some(ClimateKind::Cooler),
        ChannelCategory::Thermostat => Some(ClimateKind::Thermostat),
        ChannelCategory::Temperature => Some(ClimateKind::Sensor),
        _ => None,
    }
}

/// 解析空间内全部温控通道（含只读温度源；排除 Hidden 角色）。
pub async fn resolve_climate(
    catalog: &dyn SpaceCatalog,
    space_id: &str,
) -> Result<Vec<ClimateDevice>, CatalogError> {
    let devices = catalog.devices_in_space(space_id).await?;
    let roles = catalog.climate_roles(space_id).await?;
    let mut entries = Vec::new();
    for device in &devices {
        for channel in &device.channels {
            let Some(kind) = climate_kind(channel.category) else {
                continue;
            };
            let role = roles.get(&role_key(&device.id, &channel.id)).copied();
            if role == Some(ClimateRole::Hidden) {
                continue;
            }
            entries.push(ClimateDevice {
                device: device.clone(),
                channel: channel.clone(),
                kind,
                role,
            });
        }
    }
    Ok(entries)
}

/// 解析空间内全部窗帘通道（排除 Hidden 角色）。
pub async fn resolve_covers(
    catalog: &dyn SpaceCatalog,
    space_id: &str,
) -> Result<Vec<CoverDevice>, CatalogError> {
    let devices = catalog.devices_in_space(space_id).await?;
    let roles = catalog.covers_roles(space_id).await?;
    let mut covers = Vec::new();
    for device in &devices {
        for channel in device.channels_of(ChannelCategory::WindowCovering) {
            let role = roles.get(&role_key(&device.id, &channel.id)).copied();
            if role == Some(CoversRole::Hidden) {
                continue;
            }
            covers.push(CoverDevice {
                device: device.clone(),
                channel: channel.clone(),
                role,
            });
        }
    }
    Ok(covers)
}

/// 解析空间内全部媒体通道（播放与扬声器；排除 Hidden 角色）。
pub async fn resolve_media(
    catalog: &dyn SpaceCatalog,
    space_id: &str,
) -> Result<Vec<MediaDevice>, CatalogError> {
    let devices = catalog.devices_in_space(space_id).await?;
    let roles = catalog.media_roles(space_id).await?;
    let mut players = Vec::new();
    for device in &devices {
        for channel in &device.channels {
            if !matches!(
                channel.category,
                ChannelCategory::MediaPlayback | ChannelCategory::Speaker
            ) {
                continue;
            }
            let role = roles.get(&role_key(&device.id, &channel.id)).copied();
            if role == Some(MediaRole::Hidden) {
                continue;
            }
            players.push(MediaDevice {
                device: device.clone(),
                channel: channel.clone(),
                role,
            });
        }
    }
    Ok(players)
}
