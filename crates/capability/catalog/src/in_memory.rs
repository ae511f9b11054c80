//! 目录内存实现
//!
//! 用于测试和单机运行。

use crate::error::CatalogError;
use crate::{RoleAssignment, SpaceCatalog, role_key};
use async_trait::async_trait;
use domain::{ClimateRole, CoversRole, DeviceView, LightingRole, MediaRole, Space};
use std::collections::HashMap;
use std::sync::RwLock;

/// 内存目录。
pub struct InMemoryCatalog {
    spaces: RwLock<Vec<Space>>,
    /// space_id -> 设备列表
    devices: RwLock<HashMap<String, Vec<DeviceView>>>,
    lighting_roles: RwLock<Vec<RoleAssignment<LightingRole>>>,
    climate_roles: RwLock<Vec<RoleAssignment<ClimateRole>>>,
    covers_roles: RwLock<Vec<RoleAssignment<CoversRole>>>,
    media_roles: RwLock<Vec<RoleAssignment<MediaRole>>>,
}

impl InMemoryCatalog {
    /// 创建空目录。
    pub fn new() -> Self {
        Self {
            spaces: RwLock::new(Vec::new()),
            devices: RwLock::new(HashMap::new()),
            lighting_roles: RwLock::new(Vec::new()),
            climate_roles: RwLock::new(Vec::new()),
            covers_roles: RwLock::new(Vec::new()),
            media_roles: RwLock::new(Vec::new()),
        }
    }

    /// 新增或替换空间。
    pub fn upsert_space(&self, space: Space) -> Result<(), CatalogError> {
        let mut spaces = self
            .spaces
            .write()
            .map_err(|_| CatalogError::new("lock failed"))?;
        if let Some(existing) = spaces.iter_mut().find(|item| item.id == space.id) {
            *existing = space;
        } else {
            spaces.push(space);
        }
        Ok(())
    }

    /// 新增或替换空间内设备（按设备 id 去重）。
    pub fn upsert_device(&self, space_id: &str, device: DeviceView) -> Result<(), CatalogError> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| CatalogError::new("lock failed"))?;
        let entries = devices.entry(space_id.to_string()).or_default();
        if let Some(existing) = entries.iter_mut().find(|item| item.id == device.id) {
            *existing = device;
        } else {
            entries.push(device);
        }
        Ok(())
    }

    pub fn assign_lighting_role(
        &self,
        assignment: RoleAssignment<LightingRole>,
    ) -> Result<(), CatalogError> {
        upsert_assignment(&self.lighting_roles, assignment)
    }

    pub fn assign_climate_role(
        &self,
        assignment: RoleAssignment<ClimateRole>,
    ) -> Result<(), CatalogError> {
        upsert_assignment(&self.climate_roles, assignment)
    }

    pub fn assign_covers_role(
        &self,
        assignment: RoleAssignment<CoversRole>,
    ) -> Result<(), CatalogError> {
        upsert_assignment(&self.covers_roles, assignment)
    }

    pub fn assign_media_role(
        &self,
        assignment: RoleAssignment<MediaRole>,
    ) -> Result<(), CatalogError> {
        upsert_assignment(&self.media_roles, assignment)
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn upsert_assignment<R: Copy>(
    store: &RwLock<Vec<RoleAssignment<R>>>,
    assignment: RoleAssignment<R>,
) -> Result<(), CatalogError> {
    let mut assignments = store
        .write()
        .map_err(|_| CatalogError::new("lock failed"))?;
    if let Some(existing) = assignments.iter_mut().find(|item| {
        item.space_id == assignment.space_id
            && item.device_id == assignment.device_id
            && item.channel_id == assignment.channel_id
    }) {
        *existing = assignment;
    } else {
        assignments.push(assignment);
    }
    Ok(())
}

fn role_map<R: Copy>(
    store: &RwLock<Vec<RoleAssignment<R>>>,
    space_id: &str,
) -> Result<HashMap<String, R>, CatalogError> {
    let assignments = store.read().map_err(|_| CatalogError::new("lock failed"))?;
    Ok(assignments
        .iter()
        .filter(|item| item.space_id == space_id)
        .map(|item| (role_key(&item.device_id, &item.channel_id), item.role))
        .collect())
}

#[async_trait]
impl SpaceCatalog for InMemoryCatalog {
    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, CatalogError> {
        let spaces = self
            .spaces
            .read()
            .map_err(|_| CatalogError::new("lock failed"))?;
        Ok(spaces.iter().find(|item| item.id == space_id).cloned())
    }

    async fn devices_in_space(&self, space_id: &str) -> Result<Vec<DeviceView>, CatalogError> {
        let devices = self
            .devices
            .read()
            .map_err(|_| CatalogError::new("lock failed"))?;
        Ok(devices.get(space_id).cloned().unwrap_or_default())
    }

    async fn lighting_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, LightingRole>, CatalogError> {
        role_map(&self.lighting_roles, space_id)
    }

    async fn climate_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, ClimateRole>, CatalogError> {
        role_map(&self.climate_roles, space_id)
    }

    async fn covers_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, CoversRole>, CatalogError> {
        role_map(&self.covers_roles, space_id)
    }

    async fn media_roles(
        &self,
        space_id: &str,
    ) -> Result<HashMap<String, MediaRole>, CatalogError> {
        role_map(&self.media_roles, space_id)
    }
}
