use serde::{Deserialize, Serialize};

/// 照明角色。`Hidden` 在编排与状态聚合中一律排除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingRole {
    Main,
    Ambient,
    Accent,
    Night,
    Other,
    Hidden,
}

/// 温控角色。`Sensor` 只读（提供温度，不接收命令）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateRole {
    Auto,
    HeatingOnly,
    CoolingOnly,
    Sensor,
    Hidden,
}

/// 窗帘角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoversRole {
    Primary,
    Secondary,
    Blackout,
    Hidden,
}

/// 媒体角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaRole {
    Primary,
    Secondary,
    Hidden,
}
