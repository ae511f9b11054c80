//! # 意图生命周期注册表
//!
//! 意图是一次用户/系统动作的一等记录：PENDING 起始，恰好进入一个终态
//! （成功/部分成功/失败/过期）。终态意图立即从活跃表移除，
//! 完成因此天然幂等（二次完成返回 None）。
//!
//! 后台清理任务按固定间隔扫描过期意图；事件通过 broadcast 通道
//! 尽力投递（无订阅者时丢弃，不影响注册表自身状态）。

mod registry;
mod types;

pub use registry::{ActiveFilter, IntentRegistry, RegistryConfig};
pub use types::{
    CreateIntentInput, IntentEvent, IntentRecord, IntentScope, IntentStatus, IntentTarget,
    IntentType, TargetResult, TargetStatus,
};

/// 当前时间（epoch 毫秒）。
pub(crate) fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
