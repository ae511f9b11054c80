//! # 空间状态聚合
//!
//! 把空间内多设备的原始属性聚合为单一可读状态：
//!
//! 1. **一致性检测**（[`consensus`]）：数值在容差内视为一致，否则标记 mixed
//! 2. **设备解析**（[`resolve`]）：目录投影 → 各域设备视图（角色、离线语义）
//! 3. **模式检测**（[`lighting`]/[`climate`]/[`covers`]/[`media`]）：
//!    反推当前空间最接近的模式，并给出置信度
//! 4. **状态总线**（[`StateBus`]）：聚合结果变化的尽力广播
//!
//! 聚合只读不写；所有写路径走编排层。

mod bus;
pub mod climate;
pub mod consensus;
pub mod covers;
mod error;
pub mod lighting;
pub mod media;
pub mod resolve;

pub use bus::{StateBus, StateEvent};
pub use climate::{ClimateState, ClimateStateService, SetpointRange, clamp_setpoint};
pub use consensus::{UniformValue, uniform_value};
pub use covers::{CoversState, CoversStateService};
pub use error::StateError;
pub use lighting::{LightingState, LightingStateService};
pub use media::{MediaState, MediaStateService};
pub use resolve::{
    ClimateDevice, ClimateKind, CoverDevice, LightDevice, MediaDevice, offline_fail_closed,
    offline_fail_open, resolve_climate, resolve_covers, resolve_lights, resolve_media,
};

use serde::{Deserialize, Serialize};

/// 模式检测置信度。
///
/// `Exact`：全部参与设备与规则精确吻合；
/// `Approximate`：存在放宽容差内的偏差。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeConfidence {
    Exact,
    Approximate,
}
