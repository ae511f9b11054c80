use serde::{Deserialize, Serialize};

/// 属性值（带类型标签）。
///
/// 替代松散的 string/number/boolean 联合，下游可对
/// 数据类型做穷尽匹配。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl PropertyValue {
    /// 数值视图（整数提升为浮点）。
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::I64(value) => Some(*value as f64),
            PropertyValue::F64(value) => Some(*value),
            _ => None,
        }
    }

    /// 布尔视图。
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// 字符串视图。
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// 设备连接状态。`Unknown` 的离线语义由各域自行决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Unknown,
}

/// 设备类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Lighting,
    Thermostat,
    Heater,
    Cooler,
    WindowCovering,
    Media,
    Sensor,
    Generic,
}

/// 通道类别（设备能力面）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelCategory {
    Light,
    Heater,
    Cooler,
    Thermostat,
    Temperature,
    WindowCovering,
    MediaPlayback,
    Speaker,
    Generic,
}

/// 属性类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    On,
    Brightness,
    ColorTemperature,
    ColorRed,
    ColorGreen,
    ColorBlue,
    Hue,
    Saturation,
    Temperature,
    Mode,
    Position,
    Tilt,
    Command,
    Volume,
    Mute,
}

/// 属性投影（只读；写操作通过平台命令下发）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyView {
    pub id: String,
    pub category: PropertyCategory,
    pub value: Option<PropertyValue>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PropertyView {
    /// 构造无范围约束的属性。
    pub fn new(id: impl Into<String>, category: PropertyCategory) -> Self {
        Self {
            id: id.into(),
            category,
            value: None,
            min: None,
            max: None,
        }
    }

    /// 当前数值（无值或非数值返回 None）。
    pub fn number_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(PropertyValue::as_f64)
    }

    /// 当前布尔值。
    pub fn bool_value(&self) -> Option<bool> {
        self.value.as_ref().and_then(PropertyValue::as_bool)
    }

    /// 按属性声明的 min/max 裁剪写入值。
    pub fn clamp(&self, value: f64) -> f64 {
        let mut value = value;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        value
    }
}

/// 通道投影。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelView {
    pub id: String,
    pub category: ChannelCategory,
    pub properties: Vec<PropertyView>,
}

impl ChannelView {
    /// 查找指定类别的属性（取第一个）。
    pub fn property(&self, category: PropertyCategory) -> Option<&PropertyView> {
        self.properties.iter().find(|p| p.category == category)
    }
}

/// 设备投影：每次编排调用从目录按需构建，核心不修改它。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceView {
    pub id: String,
    pub name: String,
    /// 平台驱动标识（平台注册表按此路由命令）。
    pub driver: String,
    pub category: DeviceCategory,
    pub online: bool,
    pub connection: ConnectionState,
    pub channels: Vec<ChannelView>,
}

impl DeviceView {
    /// 指定类别的全部通道。
    pub fn channels_of(&self, category: ChannelCategory) -> impl Iterator<Item = &ChannelView> {
        self.channels.iter().filter(move |ch| ch.category == category)
    }
}
