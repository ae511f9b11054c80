//! # 空间/设备目录
//!
//! 面向编排核心的只读设备目录抽象与角色分配存储：
//!
//! 1. **接口抽象**（[`SpaceCatalog`]）：空间查询、设备投影、各域角色映射
//! 2. **内存实现**（[`in_memory`]）：`RwLock<HashMap>` 存储，用于测试与单机运行
//!
//! 目录只提供投影，核心从不经由目录修改设备状态；
//! 写操作一律通过平台命令下发。

mod error;
pub mod in_memory;

pub use error::CatalogError;
pub use in_memory::InMemoryCatalog;

use async_trait::async_trait;
use domain::{ClimateRole, CoversRole, DeviceView, LightingRole, MediaRole, Space};
use std::collections::HashMap;

/// 角色分配记录（按 `deviceId:channelId` 归属）。
#[derive(Debug, Clone)]
pub struct RoleAssignment<R> {
    pub space_id: String,
    pub device_id: String,
    pub channel_id: String,
    pub role: R,
    pub priority: i32,
}

/// 角色映射的键：`deviceId:channelId`。
pub fn role_key(device_id: &str, channel_id: &str) -> String {
    format!("{}:{}", device_id, channel_id)
}

/// 空间目录接口。
#[async_trait]
pub trait SpaceCatalog: Send + Sync {
    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, CatalogError>;

    /// 空间内全部设备的投影（含连接状态与当前属性值）。
    async fn devices_in_space(&self, space_id: &str) -> Result<Vec<DeviceView>, CatalogError>;

    async fn lighting_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, LightingRole>, CatalogError>;

    async fn climate_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, ClimateRole>, CatalogError>;

    async fn covers_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, CoversRole>, CatalogError>;

    async fn media_roles(&self, space_id: &str)
        -> Result<HashMap<String, MediaRole>, CatalogError>;
}
