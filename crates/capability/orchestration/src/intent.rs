//! 各域意图 DTO 与入参校验。
//!
//! 校验失败的请求在进入意图注册表之前即被拒绝。

use crate::OrchestrationError;
use domain::{ClimateMode, CoversMode, LightingMode, MediaMode};
use serde::Deserialize;

fn ensure_range(
    name: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), OrchestrationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(OrchestrationError::Validation(format!(
            "{} must be between {} and {}",
            name, min, max
        )));
    }
    Ok(())
}

/// 照明域意图。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LightingIntent {
    #[serde(rename = "lighting.setMode")]
    SetMode { mode: LightingMode },
    #[serde(rename = "light.toggle")]
    Toggle { on: bool },
    #[serde(rename = "light.setBrightness")]
    SetBrightness { brightness: f64 },
    #[serde(rename = "lighting.brightnessDelta")]
    BrightnessDelta { delta: f64 },
}

impl LightingIntent {
    pub fn validate(&self) -> Result<(), OrchestrationError> {
        match self {
            LightingIntent::SetBrightness { brightness } => {
                ensure_range("brightness", *brightness, 0.0, 100.0)
            }
            LightingIntent::BrightnessDelta { delta } => {
                ensure_range("delta", *delta, -100.0, 100.0)
            }
            _ => Ok(()),
        }
    }
}

/// 温控域意图。`delta` 以 0.5 °C 为一档。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClimateIntent {
    #[serde(rename = "climate.setMode")]
    SetMode { mode: ClimateMode },
    #[serde(rename = "climate.setpointSet")]
    SetpointSet { setpoint: f64 },
    #[serde(rename = "climate.setpointDelta")]
    SetpointDelta { steps: i32 },
}

impl ClimateIntent {
    pub fn validate(&self) -> Result<(), OrchestrationError> {
        match self {
            ClimateIntent::SetpointSet { setpoint } => {
                ensure_range("setpoint", *setpoint, 0.0, 50.0)
            }
            ClimateIntent::SetpointDelta { steps } => {
                if steps.unsigned_abs() > 40 {
                    return Err(OrchestrationError::Validation(
                        "steps must be between -40 and 40".to_string(),
                    ));
                }
                Ok(())
            }
            ClimateIntent::SetMode { .. } => Ok(()),
        }
    }
}

/// 窗帘域意图。位置约定 0 = 全关、100 = 全开。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CoversIntent {
    #[serde(rename = "covers.open")]
    Open,
    #[serde(rename = "covers.close")]
    Close,
    #[serde(rename = "covers.setPosition")]
    SetPosition { position: f64 },
    #[serde(rename = "covers.positionDelta")]
    PositionDelta {
        #[serde(default)]
        delta: Option<f64>,
    },
    #[serde(rename = "covers.setMode")]
    SetMode { mode: CoversMode },
}

/// `covers.positionDelta` 未指定步长时的默认值。
pub const DEFAULT_POSITION_DELTA: f64 = 25.0;

impl CoversIntent {
    pub fn validate(&self) -> Result<(), OrchestrationError> {
        match self {
            CoversIntent::SetPosition { position } => {
                ensure_range("position", *position, 0.0, 100.0)
            }
            CoversIntent::PositionDelta { delta: Some(delta) } => {
                ensure_range("delta", *delta, -100.0, 100.0)
            }
            _ => Ok(()),
        }
    }
}

/// 媒体域意图。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MediaIntent {
    #[serde(rename = "media.power")]
    Power { on: bool },
    #[serde(rename = "media.volumeSet")]
    VolumeSet { volume: f64 },
    #[serde(rename = "media.mute")]
    Mute { mute: bool },
    #[serde(rename = "media.setMode")]
    SetMode { mode: MediaMode },
}

impl MediaIntent {
    pub fn validate(&self) -> Result<(), OrchestrationError> {
        match self {
            MediaIntent::VolumeSet { volume } => ensure_range("volume", *volume, 0.0, 100.0),
            _ => Ok(()),
        }
    }
}
