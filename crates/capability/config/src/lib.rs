//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 状态聚合的一致性容差（按属性区分）。
#[derive(Debug, Clone, Copy)]
pub struct ConsensusTolerances {
    pub brightness: f64,
    pub color_temperature: f64,
    pub setpoint: f64,
    pub rgb_component: f64,
    pub hue: f64,
    pub saturation: f64,
    pub position: f64,
    pub volume: f64,
}

impl Default for ConsensusTolerances {
    fn default() -> Self {
        Self {
            brightness: 5.0,
            color_temperature: 100.0,
            setpoint: 0.5,
            rgb_component: 10.0,
            hue: 5.0,
            saturation: 0.05,
            position: 5.0,
            volume: 5.0,
        }
    }
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub http_addr: String,
    /// 设备级命令意图的默认 TTL（毫秒）。
    pub intent_ttl_device_ms: u64,
    /// 空间级编排意图的默认 TTL（毫秒）。
    pub intent_ttl_space_ms: u64,
    pub intent_sweep_interval_ms: u64,
    pub undo_max_entries_per_space: usize,
    pub undo_entry_ttl_ms: u64,
    pub undo_sweep_interval_ms: u64,
    pub tolerances: ConsensusTolerances,
    pub mqtt_enabled: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_command_topic_prefix: String,
    pub mqtt_command_qos: u8,
    pub seed_demo: bool,
}

impl HubConfig {
    /// 从环境变量读取配置（全部带默认值，可零配置启动）。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("HUB_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let intent_ttl_device_ms = read_u64_with_default("HUB_INTENT_TTL_DEVICE_MS", 10_000)?;
        let intent_ttl_space_ms = read_u64_with_default("HUB_INTENT_TTL_SPACE_MS", 30_000)?;
        let intent_sweep_interval_ms = read_u64_with_default("HUB_INTENT_SWEEP_INTERVAL_MS", 500)?;
        let undo_max_entries_per_space =
            read_u64_with_default("HUB_UNDO_MAX_ENTRIES", 1)?.max(1) as usize;
        let undo_entry_ttl_ms = read_u64_with_default("HUB_UNDO_TTL_MS", 300_000)?;
        let undo_sweep_interval_ms = read_u64_with_default("HUB_UNDO_SWEEP_INTERVAL_MS", 60_000)?;
        let tolerances = read_tolerances()?;
        let mqtt_enabled = read_bool_with_default("HUB_MQTT", false);
        let mqtt_host = env::var("HUB_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("HUB_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("HUB_MQTT_USERNAME");
        let mqtt_password = read_optional("HUB_MQTT_PASSWORD");
        let mqtt_command_topic_prefix =
            env::var("HUB_MQTT_COMMAND_TOPIC_PREFIX").unwrap_or_else(|_| "hub/commands".to_string());
        let mqtt_command_qos = read_u8_with_default("HUB_MQTT_COMMAND_QOS", 1)?;
        let seed_demo = read_bool_with_default("HUB_SEED_DEMO", false);

        Ok(Self {
            http_addr,
            intent_ttl_device_ms,
            intent_ttl_space_ms,
            intent_sweep_interval_ms,
            undo_max_entries_per_space,
            undo_entry_ttl_ms,
            undo_sweep_interval_ms,
            tolerances,
            mqtt_enabled,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_command_topic_prefix,
            mqtt_command_qos,
            seed_demo,
        })
    }
}

fn read_tolerances() -> Result<ConsensusTolerances, ConfigError> {
    let defaults = ConsensusTolerances::default();
    Ok(ConsensusTolerances {
        brightness: read_f64_with_default("HUB_TOLERANCE_BRIGHTNESS", defaults.brightness)?,
        color_temperature: read_f64_with_default(
            "HUB_TOLERANCE_COLOR_TEMP",
            defaults.color_temperature,
        )?,
        setpoint: read_f64_with_default("HUB_TOLERANCE_SETPOINT", defaults.setpoint)?,
        rgb_component: read_f64_with_default("HUB_TOLERANCE_RGB", defaults.rgb_component)?,
        hue: read_f64_with_default("HUB_TOLERANCE_HUE", defaults.hue)?,
        saturation: read_f64_with_default("HUB_TOLERANCE_SATURATION", defaults.saturation)?,
        position: read_f64_with_default("HUB_TOLERANCE_POSITION", defaults.position)?,
        volume: read_f64_with_default("HUB_TOLERANCE_VOLUME", defaults.volume)?,
    })
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_f64_with_default(key: &str, default: f64) -> Result<f64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<f64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
