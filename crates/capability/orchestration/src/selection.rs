//! 角色选择：纯函数，无副作用，单独可测。
//!
//! 输入是解析后的域设备视图与目标模式，输出是每通道的
//! 目标动作。离线过滤、属性裁剪、命令装配都在编排层做。

use domain::rules::{LightRule, covers_position, lighting_fallback, lighting_rule, media_rule};
use domain::{
    ClimateMode, ClimateRole, CoversMode, CoversRole, LightingMode, LightingRole, MediaMode,
    MediaRole,
};
use hub_state::{CoverDevice, LightDevice, MediaDevice};

/// 灯光通道的目标动作。
#[derive(Debug, Clone, PartialEq)]
pub struct LightAction {
    pub device_id: String,
    pub channel_id: String,
    pub on: bool,
    pub brightness: Option<f64>,
    pub is_fallback: bool,
}

/// 照明模式 → 动作列表。返回值第二项表示是否触发了回退。
///
/// 三层规则：
/// 1. 空间完全无角色 → MVP 基线：全开，亮度取模式基线；
/// 2. 有角色：未分配角色的灯归入 `Other`，按规则表执行，
///    规则缺失按安全默认（关）；
/// 3. 目标角色无设备（如 NIGHT 无夜灯）→ 回退角色获得
///    回退亮度并打上 fallback 标记。
pub fn select_lighting(lights: &[LightDevice], mode: LightingMode) -> (Vec<LightAction>, bool) {
    let has_roles = lights.iter().any(|light| light.role.is_some());
    if !has_roles {
        let baseline = mode.baseline_brightness();
        let actions = lights
            .iter()
            .map(|light| LightAction {
                device_id: light.device.id.clone(),
                channel_id: light.channel.id.clone(),
                on: true,
                brightness: Some(baseline),
                is_fallback: false,
            })
            .collect();
        return (actions, false);
    }

    let mut actions: Vec<LightAction> = lights
        .iter()
        .map(|light| {
            let role = light.role.unwrap_or(LightingRole::Other);
            let rule = lighting_rule(mode, role).unwrap_or_else(LightRule::off);
            LightAction {
                device_id: light.device.id.clone(),
                channel_id: light.channel.id.clone(),
                on: rule.on,
                brightness: rule.brightness,
                is_fallback: false,
            }
        })
        .collect();

    let mut triggered_fallback = false;
    if let Some(fallback) = lighting_fallback(mode) {
        let night_present = lights
            .iter()
            .any(|light| light.role == Some(LightingRole::Night));
        if !night_present {
            for (light, action) in lights.iter().zip(actions.iter_mut()) {
                let role = light.role.unwrap_or(LightingRole::Other);
                if fallback.roles.contains(&role) {
                    action.on = true;
                    action.brightness = Some(fallback.brightness);
                    action.is_fallback = true;
                    triggered_fallback = true;
                }
            }
        }
    }
    (actions, triggered_fallback)
}

/// 窗帘通道的目标位置。
#[derive(Debug, Clone, PartialEq)]
pub struct CoverAction {
    pub device_id: String,
    pub channel_id: String,
    pub position: f64,
}

/// 窗帘模式 → 动作列表。
/// 无角色空间全体取模式基线；未分配角色的窗帘归入 `Primary`；
/// 规则缺失按安全默认（关，位置 0）。
pub fn select_covers(covers: &[CoverDevice], mode: CoversMode) -> Vec<CoverAction> {
    let has_roles = covers.iter().any(|cover| cover.role.is_some());
    covers
        .iter()
        .map(|cover| {
            let position = if has_roles {
                let role = cover.role.unwrap_or(CoversRole::Primary);
                covers_position(mode, role).unwrap_or(0.0)
            } else {
                mode.baseline_position()
            };
            CoverAction {
                device_id: cover.device.id.clone(),
                channel_id: cover.channel.id.clone(),
                position,
            }
        })
        .collect()
}

/// 媒体通道的目标动作。
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAction {
    pub device_id: String,
    pub channel_id: String,
    pub on: bool,
    pub volume: Option<f64>,
    pub is_fallback: bool,
}

/// 媒体模式 → 动作列表。未分配角色的设备按 `Secondary`
/// 执行并打上 fallback 标记。
pub fn select_media(players: &[MediaDevice], mode: MediaMode) -> (Vec<MediaAction>, bool) {
    let mut triggered_fallback = false;
    let actions = players
        .iter()
        .map(|player| {
            let (role, is_fallback) = match player.role {
                Some(role) => (role, false),
                None => {
                    triggered_fallback = true;
                    (MediaRole::Secondary, true)
                }
            };
            let rule = media_rule(mode, role).unwrap_or(domain::rules::MediaRule {
                on: false,
                volume: None,
            });
            MediaAction {
                device_id: player.device.id.clone(),
                channel_id: player.channel.id.clone(),
                on: rule.on,
                volume: rule.volume,
                is_fallback,
            }
        })
        .collect();
    (actions, triggered_fallback)
}

/// 温控模式 → 制热/制冷执行器的开关组合。
pub fn climate_power_table(mode: ClimateMode) -> (bool, bool) {
    match mode {
        ClimateMode::Auto => (true, true),
        ClimateMode::Heat => (true, false),
        ClimateMode::Cool => (false, true),
        ClimateMode::Off => (false, false),
    }
}

/// 温控模式 + 执行器角色 → (制热开, 制冷开)。
/// `HeatingOnly` 永不参与制冷，`CoolingOnly` 永不参与制热。
pub fn climate_power_for_role(mode: ClimateMode, role: Option<ClimateRole>) -> (bool, bool) {
    let (heater_on, cooler_on) = climate_power_table(mode);
    match role {
        Some(ClimateRole::HeatingOnly) => (heater_on, false),
        Some(ClimateRole::CoolingOnly) => (false, cooler_on),
        _ => (heater_on, cooler_on),
    }
}

/// 温控模式 → 恒温器 Mode 属性写入值。
pub fn thermostat_mode_value(mode: ClimateMode) -> &'static str {
    match mode {
        ClimateMode::Auto => "auto",
        ClimateMode::Heat => "heat",
        ClimateMode::Cool => "cool",
        ClimateMode::Off => "off",
    }
}

/// 按执行器角色收窄后的恒温器 Mode 写入值：
/// 单向设备不接受反向模式（写 off），Auto 退化为该方向。
pub fn thermostat_mode_for_role(mode: ClimateMode, role: Option<ClimateRole>) -> &'static str {
    match (role, mode) {
        (Some(ClimateRole::HeatingOnly), ClimateMode::Cool) => "off",
        (Some(ClimateRole::HeatingOnly), ClimateMode::Auto) => "heat",
        (Some(ClimateRole::CoolingOnly), ClimateMode::Heat) => "off",
        (Some(ClimateRole::CoolingOnly), ClimateMode::Auto) => "cool",
        _ => thermostat_mode_value(mode),
    }
}
