//! # 空间编排
//!
//! 空间级意图的执行引擎，四个域共用同一条骨架：
//!
//! 1. **校验**：非法入参在意图创建前被拒绝，绝不产生 PENDING
//! 2. **解析**：目录投影 → 域设备视图，按域语义做离线分区
//! 3. **登记**：创建空间级意图（目标为去重后的设备列表）
//! 4. **快照**：写前捕获撤销快照（失败只记日志）
//! 5. **选择**：纯函数角色选择（[`selection`]）生成目标动作
//! 6. **下发**：按设备批量写入平台，逐设备记录成败
//! 7. **收尾**：完成意图、落历史、广播状态变化
//!
//! 成功判定保持宽松：没有失败、或至少一台设备生效即算成功。

mod climate;
mod common;
mod covers;
mod error;
mod intent;
mod lighting;
mod media;
mod result;
pub mod selection;

pub use climate::ClimateOrchestrator;
pub use covers::CoversOrchestrator;
pub use error::OrchestrationError;
pub use intent::{
    ClimateIntent, CoversIntent, DEFAULT_POSITION_DELTA, LightingIntent, MediaIntent,
};
pub use lighting::LightingOrchestrator;
pub use media::MediaOrchestrator;
pub use result::ExecutionResult;
