//! 模式编排规则表（内置默认）。
//!
//! 模式 → 角色 → 规则的映射是编排与模式检测共用的词汇表：
//! 编排据此生成命令，状态聚合据此反推当前模式。

use crate::modes::{CoversMode, LightingMode, MediaMode};
use crate::roles::{CoversRole, LightingRole, MediaRole};

/// 照明角色规则。`brightness` 仅在 `on` 时有意义。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRule {
    pub on: bool,
    pub brightness: Option<f64>,
}

impl LightRule {
    pub const fn on(brightness: f64) -> Self {
        Self {
            on: true,
            brightness: Some(brightness),
        }
    }

    pub const fn off() -> Self {
        Self {
            on: false,
            brightness: None,
        }
    }
}

/// 目标角色无设备时的回退规则（如 NIGHT 模式无夜灯时压暗主灯）。
#[derive(Debug, Clone)]
pub struct LightingFallback {
    pub roles: Vec<LightingRole>,
    pub brightness: f64,
}

/// 照明模式下某角色的规则；未定义返回 None（安全默认：关）。
pub fn lighting_rule(mode: LightingMode, role: LightingRole) -> Option<LightRule> {
    // 两个枚举都有 Night 变体，glob 引入会撞名，这里用别名限定。
    use crate::modes::LightingMode as M;
    use crate::roles::LightingRole as R;
    match (mode, role) {
        (M::Work, R::Main) => Some(LightRule::on(100.0)),
        (M::Work, R::Ambient) => Some(LightRule::on(80.0)),
        (M::Work, R::Accent) => Some(LightRule::on(60.0)),
        (M::Work, R::Other) => Some(LightRule::on(100.0)),
        (M::Work, R::Night) => Some(LightRule::off()),
        (M::Relax, R::Main) => Some(LightRule::on(40.0)),
        (M::Relax, R::Ambient) => Some(LightRule::on(60.0)),
        (M::Relax, R::Accent) => Some(LightRule::on(50.0)),
        (M::Relax, R::Other) => Some(LightRule::off()),
        (M::Relax, R::Night) => Some(LightRule::off()),
        (M::Night, R::Night) => Some(LightRule::on(20.0)),
        (M::Night, R::Main) => Some(LightRule::off()),
        (M::Night, R::Ambient) => Some(LightRule::off()),
        (M::Night, R::Accent) => Some(LightRule::off()),
        (M::Night, R::Other) => Some(LightRule::off()),
        (_, R::Hidden) => None,
    }
}

/// 照明模式的回退配置。目前仅 NIGHT 模式定义回退。
pub fn lighting_fallback(mode: LightingMode) -> Option<LightingFallback> {
    match mode {
        LightingMode::Night => Some(LightingFallback {
            roles: vec![LightingRole::Main],
            brightness: 20.0,
        }),
        _ => None,
    }
}

/// 窗帘模式下某角色的目标位置；未定义返回 None。
pub fn covers_position(mode: CoversMode, role: CoversRole) -> Option<f64> {
    use CoversMode::*;
    use CoversRole::*;
    match (mode, role) {
        (Open, Primary) | (Open, Secondary) | (Open, Blackout) => Some(100.0),
        (Closed, Primary) | (Closed, Secondary) | (Closed, Blackout) => Some(0.0),
        (Privacy, Blackout) => Some(0.0),
        (Privacy, Primary) | (Privacy, Secondary) => Some(30.0),
        (_, Hidden) => None,
    }
}

/// 媒体角色规则。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaRule {
    pub on: bool,
    pub volume: Option<f64>,
}

/// 媒体模式下某角色的规则；未定义返回 None（安全默认：关）。
pub fn media_rule(mode: MediaMode, role: MediaRole) -> Option<MediaRule> {
    use MediaMode::*;
    use MediaRole::*;
    match (mode, role) {
        (Party, Primary) => Some(MediaRule {
            on: true,
            volume: Some(60.0),
        }),
        (Party, Secondary) => Some(MediaRule {
            on: true,
            volume: Some(40.0),
        }),
        (Background, Primary) => Some(MediaRule {
            on: true,
            volume: Some(25.0),
        }),
        (Background, Secondary) => Some(MediaRule {
            on: false,
            volume: None,
        }),
        (Quiet, Primary) | (Quiet, Secondary) => Some(MediaRule {
            on: false,
            volume: None,
        }),
        (_, Hidden) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_mode_has_main_fallback() {
        let fallback = lighting_fallback(LightingMode::Night).expect("fallback");
        assert_eq!(fallback.roles, vec![LightingRole::Main]);
        assert_eq!(fallback.brightness, 20.0);
        assert!(lighting_fallback(LightingMode::Work).is_none());
    }

    #[test]
    fn night_role_and_night_mode_stay_distinct() {
        // 夜灯角色仅在夜间模式点亮，其余模式关闭。
        assert_eq!(
            lighting_rule(LightingMode::Night, LightingRole::Night),
            Some(LightRule::on(20.0))
        );
        assert_eq!(
            lighting_rule(LightingMode::Work, LightingRole::Night),
            Some(LightRule::off())
        );
        assert_eq!(
            lighting_rule(LightingMode::Relax, LightingRole::Night),
            Some(LightRule::off())
        );
        // 夜间模式下主灯关闭。
        assert_eq!(
            lighting_rule(LightingMode::Night, LightingRole::Main),
            Some(LightRule::off())
        );
    }

    #[test]
    fn hidden_roles_have_no_rules() {
        assert!(lighting_rule(LightingMode::Work, LightingRole::Hidden).is_none());
        assert!(covers_position(CoversMode::Open, CoversRole::Hidden).is_none());
        assert!(media_rule(MediaMode::Party, MediaRole::Hidden).is_none());
    }

    #[test]
    fn covers_positions_follow_mode() {
        assert_eq!(covers_position(CoversMode::Open, CoversRole::Primary), Some(100.0));
        assert_eq!(covers_position(CoversMode::Closed, CoversRole::Blackout), Some(0.0));
        assert_eq!(covers_position(CoversMode::Privacy, CoversRole::Blackout), Some(0.0));
        assert_eq!(covers_position(CoversMode::Privacy, CoversRole::Primary), Some(30.0));
    }
}
