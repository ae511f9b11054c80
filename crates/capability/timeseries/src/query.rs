//! 查询构建与输入加固。
//!
//! 上游调用方理应已校验参数，这里仍然强制 UUID 校验与转义，
//! 作为存储边界的纵深防御。

use crate::HistoryError;

/// 校验标识符为合法 UUID。
pub fn validate_uuid(value: &str) -> Result<(), HistoryError> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| HistoryError::InvalidId(value.to_string()))
}

/// 转义将拼入单引号字符串的值：先反斜杠、后引号。
pub fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// 构建"最近一次应用的模式"查询。
/// space_id 必须是 UUID；intent_type 转义后拼入。
pub fn last_mode_query(space_id: &str, intent_type: &str) -> Result<String, HistoryError> {
    validate_uuid(space_id)?;
    Ok(format!(
        "SELECT intentId, mode, status FROM space_intent \
         WHERE spaceId = '{}' AND intentType = '{}' AND mode != '' \
         AND (status = 'completed_success' OR status = 'completed_partial') \
         ORDER BY time DESC LIMIT 1",
        escape_quoted(space_id),
        escape_quoted(intent_type),
    ))
}
