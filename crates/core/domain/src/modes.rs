use serde::{Deserialize, Serialize};

/// 照明模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingMode {
    Work,
    Relax,
    Night,
}

impl LightingMode {
    /// 无角色空间的基线亮度（MVP 规则）。
    pub fn baseline_brightness(&self) -> f64 {
        match self {
            LightingMode::Work => 100.0,
            LightingMode::Relax => 50.0,
            LightingMode::Night => 20.0,
        }
    }
}

/// 温控模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateMode {
    Auto,
    Heat,
    Cool,
    Off,
}

/// 窗帘模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoversMode {
    Open,
    Closed,
    Privacy,
}

impl CoversMode {
    /// 无角色空间的基线位置（MVP 规则）。
    pub fn baseline_position(&self) -> f64 {
        match self {
            CoversMode::Open => 100.0,
            CoversMode::Closed => 0.0,
            CoversMode::Privacy => 30.0,
        }
    }
}

/// 媒体模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaMode {
    Party,
    Background,
    Quiet,
}
