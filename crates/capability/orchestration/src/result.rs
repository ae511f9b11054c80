use serde::Serialize;

/// 一次编排执行的汇总结果。
///
/// `success` 的判定保持宽松：只要没有失败、或至少有一台设备
/// 生效，就算成功 —— 部分失败是成功的一种。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub intent_id: String,
    pub affected_devices: u32,
    pub failed_devices: u32,
    pub skipped_offline_devices: u32,
    pub offline_device_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub triggered_fallback: bool,
}

impl ExecutionResult {
    /// 按收尾计数构造结果并套用成功判定。
    pub(crate) fn from_counts(
        intent_id: String,
        affected: u32,
        failed: u32,
        offline_device_ids: Vec<String>,
        triggered_fallback: bool,
        message: Option<String>,
    ) -> Self {
        Self {
            success: failed == 0 || affected > 0,
            intent_id,
            affected_devices: affected,
            failed_devices: failed,
            skipped_offline_devices: offline_device_ids.len() as u32,
            offline_device_ids,
            message,
            triggered_fallback,
        }
    }
}
