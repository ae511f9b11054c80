use serde::{Deserialize, Serialize};

/// 意图类型（封闭枚举，序列化为线上名称）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentType {
    #[serde(rename = "light.toggle")]
    LightToggle,
    #[serde(rename = "light.setBrightness")]
    LightSetBrightness,
    #[serde(rename = "device.setProperty")]
    DeviceSetProperty,
    #[serde(rename = "lighting.setMode")]
    LightingSetMode,
    #[serde(rename = "lighting.brightnessDelta")]
    LightingBrightnessDelta,
    #[serde(rename = "climate.setMode")]
    ClimateSetMode,
    #[serde(rename = "climate.setpointSet")]
    ClimateSetpointSet,
    #[serde(rename = "climate.setpointDelta")]
    ClimateSetpointDelta,
    #[serde(rename = "covers.open")]
    CoversOpen,
    #[serde(rename = "covers.close")]
    CoversClose,
    #[serde(rename = "covers.setPosition")]
    CoversSetPosition,
    #[serde(rename = "covers.positionDelta")]
    CoversPositionDelta,
    #[serde(rename = "covers.setMode")]
    CoversSetMode,
    #[serde(rename = "media.power")]
    MediaPower,
    #[serde(rename = "media.volumeSet")]
    MediaVolumeSet,
    #[serde(rename = "media.mute")]
    MediaMute,
    #[serde(rename = "media.setMode")]
    MediaSetMode,
}

impl IntentType {
    /// 线上名称（历史存储 tag、日志）。
    pub fn wire_name(&self) -> &'static str {
        match self {
            IntentType::LightToggle => "light.toggle",
            IntentType::LightSetBrightness => "light.setBrightness",
            IntentType::DeviceSetProperty => "device.setProperty",
            IntentType::LightingSetMode => "lighting.setMode",
            IntentType::LightingBrightnessDelta => "lighting.brightnessDelta",
            IntentType::ClimateSetMode => "climate.setMode",
            IntentType::ClimateSetpointSet => "climate.setpointSet",
            IntentType::ClimateSetpointDelta => "climate.setpointDelta",
            IntentType::CoversOpen => "covers.open",
            IntentType::CoversClose => "covers.close",
            IntentType::CoversSetPosition => "covers.setPosition",
            IntentType::CoversPositionDelta => "covers.positionDelta",
            IntentType::CoversSetMode => "covers.setMode",
            IntentType::MediaPower => "media.power",
            IntentType::MediaVolumeSet => "media.volumeSet",
            IntentType::MediaMute => "media.mute",
            IntentType::MediaSetMode => "media.setMode",
        }
    }

    /// 空间级编排意图使用更长的默认 TTL。
    pub fn is_space_command(&self) -> bool {
        !matches!(
            self,
            IntentType::LightToggle
                | IntentType::LightSetBrightness
                | IntentType::DeviceSetProperty
        )
    }
}

/// 意图状态。PENDING 只会进入一个终态，且恰好一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Pending,
    CompletedSuccess,
    CompletedPartial,
    CompletedFailed,
    Expired,
}

/// 单目标执行状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Success,
    Failed,
    Timeout,
    Skipped,
}

/// 意图目标（设备，细化到通道/属性可选）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentTarget {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
}

/// 意图作用域元数据（按空间/设备查询活跃意图用）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// 单目标执行结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub device_id: String,
    pub status: TargetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 意图记录。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<IntentScope>,
    pub targets: Vec<IntentTarget>,
    pub value: serde_json::Value,
    pub status: IntentStatus,
    pub ttl_ms: u64,
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<TargetResult>>,
}

/// 创建意图的输入（调用方已完成校验）。
#[derive(Debug, Clone)]
pub struct CreateIntentInput {
    pub intent_type: IntentType,
    pub targets: Vec<IntentTarget>,
    pub value: serde_json::Value,
    pub scope: Option<IntentScope>,
    pub ttl_ms: Option<u64>,
}

/// 意图生命周期事件（尽力投递）。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum IntentEvent {
    #[serde(rename = "intent.created")]
    Created { intent: IntentRecord },
    #[serde(rename = "intent.completed")]
    #[serde(rename_all = "camelCase")]
    Completed {
        intent_id: String,
        status: IntentStatus,
        results: Vec<TargetResult>,
        completed_at_ms: i64,
    },
    #[serde(rename = "intent.expired")]
    #[serde(rename_all = "camelCase")]
    Expired {
        intent_id: String,
        status: IntentStatus,
        completed_at_ms: i64,
    },
}
