//! 温控状态聚合与模式检测。

use crate::consensus::uniform_value;
use crate::resolve::{ClimateDevice, ClimateKind, resolve_climate};
use crate::StateError;
use domain::{ClimateMode, PropertyCategory};
use hub_catalog::SpaceCatalog;
use hub_config::ConsensusTolerances;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// 设备未声明范围时的默认设定点区间（摄氏度）。
pub const DEFAULT_SETPOINT_MIN: f64 = 10.0;
pub const DEFAULT_SETPOINT_MAX: f64 = 30.0;

/// 空间允许的设定点区间。
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetpointRange {
    pub min: f64,
    pub max: f64,
}

impl Default for SetpointRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_SETPOINT_MIN,
            max: DEFAULT_SETPOINT_MAX,
        }
    }
}

/// 设定点规整：裁剪到区间、取整到 0.5、再裁剪。
pub fn clamp_setpoint(value: f64, range: SetpointRange) -> f64 {
    let clamped = value.clamp(range.min, range.max);
    let rounded = (clamped * 2.0).round() / 2.0;
    rounded.clamp(range.min, range.max)
}

/// 空间温控聚合状态。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateState {
    pub space_id: String,
    /// 温度读数的平均值（传感器 + 恒温器内置传感器）。
    pub current_temperature: Option<f64>,
    pub temperature_mixed: bool,
    /// 可控设备设定点的平均值。
    pub setpoint: Option<f64>,
    pub setpoint_mixed: bool,
    pub mode: Option<ClimateMode>,
    pub setpoint_range: SetpointRange,
}

/// 温控状态服务。
pub struct ClimateStateService {
    catalog: Arc<dyn SpaceCatalog>,
    tolerances: ConsensusTolerances,
}

impl ClimateStateService {
    pub fn new(catalog: Arc<dyn SpaceCatalog>, tolerances: ConsensusTolerances) -> Self {
        Self { catalog, tolerances }
    }

    /// 聚合空间温控状态；空间不存在返回 None。
    pub async fn get_state(&self, space_id: &str) -> Result<Option<ClimateState>, StateError> {
        if self.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let entries = resolve_climate(self.catalog.as_ref(), space_id).await?;
        // 离线（fail-closed 语义）设备不参与聚合。
        let reporting: Vec<&ClimateDevice> =
            entries.iter().filter(|e| !e.is_offline()).collect();

        let temperature_values: Vec<f64> = reporting
            .iter()
            .filter(|e| !e.is_controllable())
            .filter_map(|e| number_of(e, PropertyCategory::Temperature))
            .collect();
        let temperature = uniform_value(&temperature_values, self.tolerances.setpoint);

        let controllable: Vec<&&ClimateDevice> =
            reporting.iter().filter(|e| e.is_controllable()).collect();
        let setpoint_values: Vec<f64> = controllable
            .iter()
            .filter_map(|e| number_of(e, PropertyCategory::Temperature))
            .collect();
        let setpoint = uniform_value(&setpoint_values, self.tolerances.setpoint);

        Ok(Some(ClimateState {
            space_id: space_id.to_string(),
            current_temperature: temperature.and_then(|v| v.value),
            temperature_mixed: temperature.is_some_and(|v| v.is_mixed),
            setpoint: setpoint.and_then(|v| v.value),
            setpoint_mixed: setpoint.is_some_and(|v| v.is_mixed),
            mode: detect_mode(&controllable),
            setpoint_range: setpoint_range(space_id, &controllable),
        }))
    }

    /// 空间的设定点区间（供编排规整目标值）。
    pub async fn space_setpoint_range(
        &self,
        space_id: &str,
    ) -> Result<SetpointRange, StateError> {
        let entries = resolve_climate(self.catalog.as_ref(), space_id).await?;
        let reporting: Vec<&ClimateDevice> =
            entries.iter().filter(|e| !e.is_offline()).collect();
        let controllable: Vec<&&ClimateDevice> =
            reporting.iter().filter(|e| e.is_controllable()).collect();
        Ok(setpoint_range(space_id, &controllable))
    }
}

/// 各设备声明区间的交集；交集为空退化为并集并告警。
fn setpoint_range(space_id: &str, controllable: &[&&ClimateDevice]) -> SetpointRange {
    let mut ranges = Vec::new();
    for entry in controllable {
        let Some(prop) = entry.channel.property(PropertyCategory::Temperature) else {
            continue;
        };
        ranges.push((
            prop.min.unwrap_or(DEFAULT_SETPOINT_MIN),
            prop.max.unwrap_or(DEFAULT_SETPOINT_MAX),
        ));
    }
    if ranges.is_empty() {
        return SetpointRange::default();
    }
    let lo = ranges.iter().map(|(min, _)| *min).fold(f64::NEG_INFINITY, f64::max);
    let hi = ranges.iter().map(|(_, max)| *max).fold(f64::INFINITY, f64::min);
    if lo <= hi {
        return SetpointRange { min: lo, max: hi };
    }
    let union_lo = ranges.iter().map(|(min, _)| *min).fold(f64::INFINITY, f64::min);
    let union_hi = ranges.iter().map(|(_, max)| *max).fold(f64::NEG_INFINITY, f64::max);
    warn!(
        target: "hub.state",
        %space_id,
        "setpoint_range_disjoint_fallback_to_union"
    );
    SetpointRange {
        min: union_lo,
        max: union_hi,
    }
}

/// 温控模式检测。
///
/// 恒温器的模式属性（"auto"/"heat_cool"）直接短路为 Auto；
/// 否则由制热/制冷通道的开关组合推断。
fn detect_mode(controllable: &[&&ClimateDevice]) -> Option<ClimateMode> {
    if controllable.is_empty() {
        return None;
    }

    let mut heating = false;
    let mut cooling = false;
    for entry in controllable {
        if entry.kind == ClimateKind::Thermostat {
            if let Some(mode) = string_of(entry, PropertyCategory::Mode) {
                match mode.as_str() {
                    "auto" | "heat_cool" => return Some(ClimateMode::Auto),
                    "heat" => heating = true,
                    "cool" => cooling = true,
                    _ => {}
                }
            }
            continue;
        }
        let on = entry
            .channel
            .property(PropertyCategory::On)
            .and_then(|p| p.bool_value())
            .unwrap_or(false);
        match entry.kind {
            ClimateKind::Heater if on => heating = true,
            ClimateKind::Cooler if on => cooling = true,
            _ => {}
        }
    }

    match (heating, cooling) {
        (true, true) => Some(ClimateMode::Auto),
        (true, false) => Some(ClimateMode::Heat),
        (false, true) => Some(ClimateMode::Cool),
        (false, false) => Some(ClimateMode::Off),
    }
}

fn number_of(entry: &ClimateDevice, category: PropertyCategory) -> Option<f64> {
    entry.channel.property(category).and_then(|p| p.number_value())
}

fn string_of(entry: &ClimateDevice, category: PropertyCategory) -> Option<String> {
    entry
        .channel
        .property(category)
        .and_then(|p| p.value.as_ref())
        .and_then(|v| v.as_str().map(|s| s.to_string()))
}
