//! 状态变化广播总线。
//!
//! 尽力投递：无订阅者或落后订阅者丢失事件不是错误。

use serde::Serialize;
use tokio::sync::broadcast;

/// 状态变化事件（按域区分，载荷只带空间标识，订阅方自行拉取全量）。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "domain", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StateEvent {
    Lighting { space_id: String },
    Climate { space_id: String },
    Covers { space_id: String },
    Media { space_id: String },
}

/// 状态总线（可克隆共享）。
#[derive(Clone)]
pub struct StateBus {
    tx: broadcast::Sender<StateEvent>,
}

impl StateBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 广播事件；无订阅者时静默丢弃。
    pub fn publish(&self, event: StateEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.tx.subscribe()
    }
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new(256)
    }
}
