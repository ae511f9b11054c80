pub mod device;
pub mod modes;
pub mod roles;
pub mod rules;

pub use device::{
    ChannelCategory, ChannelView, ConnectionState, DeviceCategory, DeviceView, PropertyCategory,
    PropertyValue, PropertyView,
};
pub use modes::{ClimateMode, CoversMode, LightingMode, MediaMode};
pub use roles::{ClimateRole, CoversRole, LightingRole, MediaRole};
pub use rules::{LightRule, LightingFallback, MediaRule};

use serde::{Deserialize, Serialize};

/// 空间：设备编排的作用域单位（房间/区域）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
}

impl Space {
    /// 构造空间。
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
