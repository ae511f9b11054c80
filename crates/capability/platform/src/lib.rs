use async_trait::async_trait;
use domain::{DeviceView, PropertyValue};
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

/// 属性写命令（批量下发的最小单元）。
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCommand {
    pub device_id: String,
    pub channel_id: String,
    pub property_id: String,
    pub value: PropertyValue,
}

/// 平台层错误。
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("dispatch error: {0}")]
    Dispatch(String),
    #[error("payload error: {0}")]
    Payload(String),
}

/// 设备平台抽象：一次批量调用要么整体成功要么整体失败，
/// 边界不提供单条命令的反馈。
#[async_trait]
pub trait Platform: Send + Sync {
    async fn process_batch(&self, commands: &[PropertyCommand]) -> Result<bool, PlatformError>;
}

/// 平台注册表：按设备驱动标识路由。
pub struct PlatformRegistry {
    platforms: RwLock<HashMap<String, Arc<dyn Platform>>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self {
            platforms: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, driver: impl Into<String>, platform: Arc<dyn Platform>) {
        let mut platforms = self
            .platforms
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        platforms.insert(driver.into(), platform);
    }

    /// 查找设备对应的平台；无注册驱动返回 None。
    pub fn get(&self, device: &DeviceView) -> Option<Arc<dyn Platform>> {
        self.get_by_driver(&device.driver)
    }

    /// 按驱动标识查找平台。
    pub fn get_by_driver(&self, driver: &str) -> Option<Arc<dyn Platform>> {
        let platforms = self
            .platforms
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        platforms.get(driver).cloned()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// 空平台（总是成功，用于占位）。
#[derive(Debug, Default)]
pub struct NoopPlatform;

#[async_trait]
impl Platform for NoopPlatform {
    async fn process_batch(&self, _commands: &[PropertyCommand]) -> Result<bool, PlatformError> {
        Ok(true)
    }
}

/// 记录平台（测试用）：记录每次批量调用并返回预设结果。
pub struct RecordingPlatform {
    batches: RwLock<Vec<Vec<PropertyCommand>>>,
    result: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::with_result(true)
    }

    pub fn with_result(result: bool) -> Self {
        Self {
            batches: RwLock::new(Vec::new()),
            result,
        }
    }

    pub fn batches(&self) -> Vec<Vec<PropertyCommand>> {
        self.batches
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn process_batch(&self, commands: &[PropertyCommand]) -> Result<bool, PlatformError> {
        let mut batches = self
            .batches
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        batches.push(commands.to_vec());
        Ok(self.result)
    }
}

/// MQTT 平台配置。
#[derive(Debug, Clone)]
pub struct MqttPlatformConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub command_topic_prefix: String,
    pub qos: u8,
}

/// MQTT 平台实现：按设备发布属性命令批次。
#[derive(Clone)]
pub struct MqttPlatform {
    client: AsyncClient,
    command_topic_prefix: String,
    qos: QoS,
}

impl MqttPlatform {
    pub fn connect(
        config: MqttPlatformConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), PlatformError> {
        let client_id = format!("hub-platform-{}", uuid::Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (config.username, config.password) {
            options.set_credentials(username, password);
        }
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(err) = eventloop.poll().await {
                    warn!(target: "hub.platform", "mqtt eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
        Ok((
            Self {
                client,
                command_topic_prefix: config.command_topic_prefix,
                qos: qos_from_u8(config.qos),
            },
            handle,
        ))
    }

    fn topic_for(&self, device_id: &str) -> String {
        let prefix = self.command_topic_prefix.trim_end_matches('/');
        format!("{}/{}", prefix, device_id)
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchMqttEnvelope<'a> {
    batch_id: String,
    commands: &'a [PropertyCommand],
}

#[async_trait]
impl Platform for MqttPlatform {
    async fn process_batch(&self, commands: &[PropertyCommand]) -> Result<bool, PlatformError> {
        if commands.is_empty() {
            return Ok(true);
        }
        // 一个设备一条消息；边界语义为整批成功或整批失败。
        let mut by_device: HashMap<&str, Vec<PropertyCommand>> = HashMap::new();
        for command in commands {
            by_device
                .entry(command.device_id.as_str())
                .or_default()
                .push(command.clone());
        }
        for (device_id, device_commands) in by_device {
            let topic = self.topic_for(device_id);
            let envelope = BatchMqttEnvelope {
                batch_id: uuid::Uuid::new_v4().to_string(),
                commands: &device_commands,
            };
            let payload = serde_json::to_vec(&envelope)
                .map_err(|err| PlatformError::Payload(err.to_string()))?;
            info!(
                target: "hub.platform",
                device_id = %device_id,
                topic = %topic,
                command_count = device_commands.len(),
                payload_size = payload.len(),
                "command_batch_publish"
            );
            self.client
                .publish(topic, self.qos, false, payload)
                .await
                .map_err(|err| PlatformError::Dispatch(err.to_string()))?;
        }
        Ok(true)
    }
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_mapping_defaults_to_at_least_once() {
        assert_eq!(qos_from_u8(0), QoS::AtMostOnce);
        assert_eq!(qos_from_u8(1), QoS::AtLeastOnce);
        assert_eq!(qos_from_u8(2), QoS::ExactlyOnce);
        assert_eq!(qos_from_u8(7), QoS::AtLeastOnce);
    }
}
