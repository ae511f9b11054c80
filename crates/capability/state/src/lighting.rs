//! 照明状态聚合与模式检测。

use crate::consensus::uniform_value;
use crate::resolve::{LightDevice, resolve_lights};
use crate::{ModeConfidence, StateError};
use domain::rules::{LightRule, lighting_rule};
use domain::{LightingMode, PropertyCategory};
use hub_catalog::SpaceCatalog;
use hub_config::ConsensusTolerances;
use hub_timeseries::HistoryStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// 角色规则匹配时放宽的亮度容差。
const BRIGHTNESS_APPROX_TOLERANCE: f64 = 15.0;
/// 模式成立所需的角色匹配比例。
const MODE_MATCH_RATIO: f64 = 0.7;

/// 空间照明聚合状态。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingState {
    pub space_id: String,
    pub total_count: usize,
    pub on_count: usize,
    pub any_on: bool,
    pub all_on: bool,
    /// 部分亮部分灭时置位。
    pub is_on_mixed: bool,
    /// 点亮设备的平均亮度；无点亮设备为 None。
    pub brightness: Option<f64>,
    pub brightness_mixed: bool,
    pub color_temperature: Option<f64>,
    pub color_temperature_mixed: bool,
    pub detected_mode: Option<LightingMode>,
    pub mode_confidence: Option<ModeConfidence>,
}

/// 照明状态服务。
pub struct LightingStateService {
    catalog: Arc<dyn SpaceCatalog>,
    history: Arc<dyn HistoryStore>,
    tolerances: ConsensusTolerances,
}

impl LightingStateService {
    pub fn new(
        catalog: Arc<dyn SpaceCatalog>,
        history: Arc<dyn HistoryStore>,
        tolerances: ConsensusTolerances,
    ) -> Self {
        Self {
            catalog,
            history,
            tolerances,
        }
    }

    /// 聚合空间照明状态；空间不存在返回 None。
    pub async fn get_state(&self, space_id: &str) -> Result<Option<LightingState>, StateError> {
        if self.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let lights = resolve_lights(self.catalog.as_ref(), space_id).await?;
        // 离线（fail-open 语义）设备不参与聚合。
        let reporting: Vec<&LightDevice> = lights.iter().filter(|l| !l.is_offline()).collect();

        let total_count = reporting.len();
        let on_lights: Vec<&&LightDevice> = reporting.iter().filter(|l| is_on(l)).collect();
        let on_count = on_lights.len();

        let brightness_values: Vec<f64> = on_lights
            .iter()
            .filter_map(|l| number_of(l, PropertyCategory::Brightness))
            .collect();
        let brightness = uniform_value(&brightness_values, self.tolerances.brightness);

        let color_temp_values: Vec<f64> = on_lights
            .iter()
            .filter_map(|l| number_of(l, PropertyCategory::ColorTemperature))
            .collect();
        let color_temperature =
            uniform_value(&color_temp_values, self.tolerances.color_temperature);

        let (detected_mode, mode_confidence) = self.detect_mode(space_id, &reporting).await;

        Ok(Some(LightingState {
            space_id: space_id.to_string(),
            total_count,
            on_count,
            any_on: on_count > 0,
            all_on: total_count > 0 && on_count == total_count,
            is_on_mixed: on_count > 0 && on_count < total_count,
            brightness: brightness.and_then(|v| v.value),
            brightness_mixed: brightness.is_some_and(|v| v.is_mixed),
            color_temperature: color_temperature.and_then(|v| v.value),
            color_temperature_mixed: color_temperature.is_some_and(|v| v.is_mixed),
            detected_mode,
            mode_confidence,
        }))
    }

    /// 基于角色规则反推当前模式。
    ///
    /// 无角色设备时不做检测。多个模式同时成立时，
    /// 用最近一次成功应用的模式打破平局。
    async fn detect_mode(
        &self,
        space_id: &str,
        lights: &[&LightDevice],
    ) -> (Option<LightingMode>, Option<ModeConfidence>) {
        let roled: Vec<&&LightDevice> = lights.iter().filter(|l| l.role.is_some()).collect();
        if roled.is_empty() {
            return (None, None);
        }

        let mut candidates: Vec<(LightingMode, f64, bool)> = Vec::new();
        for mode in [LightingMode::Work, LightingMode::Relax, LightingMode::Night] {
            let mut matched = 0usize;
            let mut all_exact = true;
            for light in &roled {
                let Some(role) = light.role else { continue };
                // 规则缺失的角色按安全默认（关）对待。
                let rule = lighting_rule(mode, role).unwrap_or_else(LightRule::off);
                match matches_rule(light, rule, self.tolerances.brightness) {
                    RuleMatch::Exact => matched += 1,
                    RuleMatch::Approximate => {
                        matched += 1;
                        all_exact = false;
                    }
                    RuleMatch::None => {}
                }
            }
            let ratio = matched as f64 / roled.len() as f64;
            if ratio >= MODE_MATCH_RATIO {
                candidates.push((mode, ratio, all_exact));
            }
        }

        match candidates.len() {
            0 => (None, None),
            1 => confidence_of(candidates[0]),
            _ => {
                if let Some(last) = self.last_applied(space_id).await {
                    if let Some(found) = candidates
                        .iter()
                        .find(|(mode, _, _)| mode_name(*mode) == last)
                    {
                        return confidence_of(*found);
                    }
                }
                let best = candidates
                    .iter()
                    .copied()
                    .max_by(|a, b| a.1.total_cmp(&b.1));
                best.map(confidence_of).unwrap_or((None, None))
            }
        }
    }

    async fn last_applied(&self, space_id: &str) -> Option<String> {
        match self
            .history
            .last_applied_mode(space_id, "lighting.setMode")
            .await
        {
            Ok(last) => last.map(|l| l.mode),
            Err(error) => {
                warn!(target: "hub.state", %space_id, %error, "last_mode_lookup_failed");
                None
            }
        }
    }
}

enum RuleMatch {
    Exact,
    Approximate,
    None,
}

fn matches_rule(light: &LightDevice, rule: LightRule, exact_tolerance: f64) -> RuleMatch {
    let on = is_on(light);
    if on != rule.on {
        return RuleMatch::None;
    }
    if !on {
        return RuleMatch::Exact;
    }
    let Some(expected) = rule.brightness else {
        return RuleMatch::Exact;
    };
    // 无亮度属性的开关灯只按开关状态匹配。
    let Some(actual) = number_of(light, PropertyCategory::Brightness) else {
        return RuleMatch::Exact;
    };
    let diff = (actual - expected).abs();
    if diff <= exact_tolerance {
        RuleMatch::Exact
    } else if diff <= BRIGHTNESS_APPROX_TOLERANCE {
        RuleMatch::Approximate
    } else {
        RuleMatch::None
    }
}

fn confidence_of(
    candidate: (LightingMode, f64, bool),
) -> (Option<LightingMode>, Option<ModeConfidence>) {
    let (mode, _, all_exact) = candidate;
    let confidence = if all_exact {
        ModeConfidence::Exact
    } else {
        ModeConfidence::Approximate
    };
    (Some(mode), Some(confidence))
}

fn mode_name(mode: LightingMode) -> &'static str {
    match mode {
        LightingMode::Work => "work",
        LightingMode::Relax => "relax",
        LightingMode::Night => "night",
    }
}

fn is_on(light: &LightDevice) -> bool {
    light
        .channel
        .property(PropertyCategory::On)
        .and_then(|p| p.bool_value())
        .unwrap_or(false)
}

fn number_of(light: &LightDevice, category: PropertyCategory) -> Option<f64> {
    light.channel.property(category).and_then(|p| p.number_value())
}
