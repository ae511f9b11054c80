//! 窗帘状态聚合与模式检测。

use crate::consensus::uniform_value;
use crate::resolve::{CoverDevice, resolve_covers};
use crate::{ModeConfidence, StateError};
use domain::rules::covers_position;
use domain::{CoversMode, PropertyCategory};
use hub_catalog::SpaceCatalog;
use hub_config::ConsensusTolerances;
use hub_timeseries::HistoryStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// 角色规则匹配时放宽的位置容差。
const POSITION_APPROX_TOLERANCE: f64 = 15.0;
/// 模式成立所需的匹配比例。
const MODE_MATCH_RATIO: f64 = 0.7;

/// 空间窗帘聚合状态。位置约定 0 = 全关、100 = 全开。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoversState {
    pub space_id: String,
    pub total_count: usize,
    pub position: Option<f64>,
    pub position_mixed: bool,
    pub any_open: bool,
    pub all_closed: bool,
    pub detected_mode: Option<CoversMode>,
    pub mode_confidence: Option<ModeConfidence>,
}

/// 窗帘状态服务。
pub struct CoversStateService {
    catalog: Arc<dyn SpaceCatalog>,
    history: Arc<dyn HistoryStore>,
    tolerances: ConsensusTolerances,
}

impl CoversStateService {
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

    /// 聚合空间窗帘状态；空间不存在返回 None。
    pub async fn get_state(&self, space_id: &str) -> Result<Option<CoversState>, StateError> {
        if self.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let covers = resolve_covers(self.catalog.as_ref(), space_id).await?;
        // 离线（fail-closed 语义）设备不参与聚合。
        let reporting: Vec<&CoverDevice> = covers.iter().filter(|c| !c.is_offline()).collect();

        let positions: Vec<f64> = reporting.iter().filter_map(|c| position_of(c)).collect();
        let position = uniform_value(&positions, self.tolerances.position);
        let any_open = positions.iter().any(|p| *p > 0.0);
        let all_closed = !positions.is_empty() && positions.iter().all(|p| *p <= 0.0);

        let (detected_mode, mode_confidence) = self.detect_mode(space_id, &reporting).await;

        Ok(Some(CoversState {
            space_id: space_id.to_string(),
            total_count: reporting.len(),
            position: position.and_then(|v| v.value),
            position_mixed: position.is_some_and(|v| v.is_mixed),
            any_open,
            all_closed,
            detected_mode,
            mode_confidence,
        }))
    }

    /// 按角色规则反推模式；无角色空间退回基线位置比对。
    async fn detect_mode(
        &self,
        space_id: &str,
        covers: &[&CoverDevice],
    ) -> (Option<CoversMode>, Option<ModeConfidence>) {
        if covers.is_empty() {
            return (None, None);
        }
        let has_roles = covers.iter().any(|c| c.role.is_some());

        let mut candidates: Vec<(CoversMode, f64, bool)> = Vec::new();
        for mode in [CoversMode::Open, CoversMode::Closed, CoversMode::Privacy] {
            let mut matched = 0usize;
            let mut all_exact = true;
            for cover in covers {
                let expected = match cover.role {
                    Some(role) if has_roles => match covers_position(mode, role) {
                        Some(position) => position,
                        // 规则缺失按安全默认（关）对待。
                        None => 0.0,
                    },
                    _ => mode.baseline_position(),
                };
                let Some(actual) = position_of(cover) else {
                    continue;
                };
                let diff = (actual - expected).abs();
                if diff <= self.tolerances.position {
                    matched += 1;
                } else if diff <= POSITION_APPROX_TOLERANCE {
                    matched += 1;
                    all_exact = false;
                }
            }
            let ratio = matched as f64 / covers.len() as f64;
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
            .last_applied_mode(space_id, "covers.setMode")
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

fn confidence_of(
    candidate: (CoversMode, f64, bool),
) -> (Option<CoversMode>, Option<ModeConfidence>) {
    let (mode, _, all_exact) = candidate;
    let confidence = if all_exact {
        ModeConfidence::Exact
    } else {
        ModeConfidence::Approximate
    };
    (Some(mode), Some(confidence))
}

fn mode_name(mode: CoversMode) -> &'static str {
    match mode {
        CoversMode::Open => "open",
        CoversMode::Closed => "closed",
        CoversMode::Privacy => "privacy",
    }
}

fn position_of(cover: &CoverDevice) -> Option<f64> {
    cover
        .channel
        .property(PropertyCategory::Position)
        .and_then(|p| p.number_value())
}
