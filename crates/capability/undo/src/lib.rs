//! # 撤销快照
//!
//! 空间级写操作的"后悔药"：
//!
//! 1. **捕获**（[`capture_space`]）：写前读取目录投影，生成空间快照
//! 2. **有界栈**（[`UndoManager`]）：每空间默认仅保留最新一条，带 TTL
//! 3. **回放**（[`UndoExecutor`]）：取出条目，经平台注册表下发恢复命令
//!
//! 捕获失败只记日志，绝不阻塞触发它的编排；
//! 回放至少恢复一台设备即视为成功。

mod color;
mod executor;
mod manager;
mod snapshot;

pub use color::{hex_to_rgb, hsv_to_hex, rgb_to_hex};
pub use executor::{UndoExecutor, UndoOutcome};
pub use manager::{UndoConfig, UndoEntry, UndoManager};
pub use snapshot::{
    ClimateSnapshot, CoverSnapshot, LightSnapshot, RgbPropertyIds, SpaceSnapshot, capture_space,
};
