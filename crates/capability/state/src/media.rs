//! 媒体状态聚合与模式检测。

use crate::consensus::uniform_value;
use crate::resolve::{MediaDevice, resolve_media};
use crate::{ModeConfidence, StateError};
use domain::rules::{MediaRule, media_rule};
use domain::{MediaMode, MediaRole, PropertyCategory};
use hub_catalog::SpaceCatalog;
use hub_config::ConsensusTolerances;
use hub_timeseries::HistoryStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// 模式近似成立所需的匹配比例（全量匹配才是精确）。
const MODE_APPROX_RATIO: f64 = 0.8;

/// 空间媒体聚合状态。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaState {
    pub space_id: String,
    pub total_count: usize,
    pub playing_count: usize,
    pub any_playing: bool,
    /// 部分播放部分停止时置位。
    pub is_on_mixed: bool,
    /// 播放中设备的平均音量。
    pub volume: Option<f64>,
    pub volume_mixed: bool,
    pub detected_mode: Option<MediaMode>,
    pub mode_confidence: Option<ModeConfidence>,
}

/// 媒体状态服务。
pub struct MediaStateService {
    catalog: Arc<dyn SpaceCatalog>,
    history: Arc<dyn HistoryStore>,
    tolerances: ConsensusTolerances,
}

impl MediaStateService {
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

    /// 聚合空间媒体状态；空间不存在返回 None。
    pub async fn get_state(&self, space_id: &str) -> Result<Option<MediaState>, StateError> {
        if self.catalog.find_space(space_id).await?.is_none() {
            return Ok(None);
        }
        let players = resolve_media(self.catalog.as_ref(), space_id).await?;
        // 离线（fail-open 语义）设备不参与聚合。
        let reporting: Vec<&MediaDevice> = players.iter().filter(|p| !p.is_offline()).collect();

        let playing: Vec<&&MediaDevice> = reporting.iter().filter(|p| is_on(p)).collect();
        let volume_values: Vec<f64> = playing.iter().filter_map(|p| volume_of(p)).collect();
        let volume = uniform_value(&volume_values, self.tolerances.volume);

        let (detected_mode, mode_confidence) = self.detect_mode(space_id, &reporting).await;

        Ok(Some(MediaState {
            space_id: space_id.to_string(),
            total_count: reporting.len(),
            playing_count: playing.len(),
            any_playing: !playing.is_empty(),
            is_on_mixed: !playing.is_empty() && playing.len() < reporting.len(),
            volume: volume.and_then(|v| v.value),
            volume_mixed: volume.is_some_and(|v| v.is_mixed),
            detected_mode,
            mode_confidence,
        }))
    }

    /// 媒体模式检测：全部角色吻合为精确，八成以上为近似。
    async fn detect_mode(
        &self,
        space_id: &str,
        players: &[&MediaDevice],
    ) -> (Option<MediaMode>, Option<ModeConfidence>) {
        let roled: Vec<&&MediaDevice> = players.iter().filter(|p| p.role.is_some()).collect();
        if roled.is_empty() {
            return (None, None);
        }

        let mut candidates: Vec<(MediaMode, f64)> = Vec::new();
        for mode in [MediaMode::Party, MediaMode::Background, MediaMode::Quiet] {
            let mut matched = 0usize;
            for player in &roled {
                let role = player.role.unwrap_or(MediaRole::Primary);
                let rule = media_rule(mode, role).unwrap_or(MediaRule {
                    on: false,
                    volume: None,
                });
                if matches_rule(player, rule, self.tolerances.volume) {
                    matched += 1;
                }
            }
            let ratio = matched as f64 / roled.len() as f64;
            if ratio >= MODE_APPROX_RATIO {
                candidates.push((mode, ratio));
            }
        }

        match candidates.len() {
            0 => (None, None),
            1 => confidence_of(candidates[0]),
            _ => {
                if let Some(last) = self.last_applied(space_id).await {
                    if let Some(found) =
                        candidates.iter().find(|(mode, _)| mode_name(*mode) == last)
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
            .last_applied_mode(space_id, "media.setMode")
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

fn confidence_of(candidate: (MediaMode, f64)) -> (Option<MediaMode>, Option<ModeConfidence>) {
    let (mode, ratio) = candidate;
    let confidence = if ratio >= 1.0 {
        ModeConfidence::Exact
    } else {
        ModeConfidence::Approximate
    };
    (Some(mode), Some(confidence))
}

fn mode_name(mode: MediaMode) -> &'static str {
    match mode {
        MediaMode::Party => "party",
        MediaMode::Background => "background",
        MediaMode::Quiet => "quiet",
    }
}

fn matches_rule(player: &MediaDevice, rule: MediaRule, volume_tolerance: f64) -> bool {
    let on = is_on(player);
    if on != rule.on {
        return false;
    }
    if !on {
        return true;
    }
    let Some(expected) = rule.volume else {
        return true;
    };
    match volume_of(player) {
        Some(actual) => (actual - expected).abs() <= volume_tolerance,
        None => true,
    }
}

fn is_on(player: &MediaDevice) -> bool {
    player
        .channel
        .property(PropertyCategory::On)
        .and_then(|p| p.bool_value())
        .unwrap_or(false)
}

fn volume_of(player: &MediaDevice) -> Option<f64> {
    player
        .channel
        .property(PropertyCategory::Volume)
        .and_then(|p| p.number_value())
}
