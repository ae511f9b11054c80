//! 数值一致性检测。

/// 一组数值的聚合结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformValue {
    /// 容差内的平均值；混合状态下不报任意值，置 None。
    pub value: Option<f64>,
    /// 极差超出容差即为混合状态。
    pub is_mixed: bool,
}

/// 聚合一组数值：容差内取平均，超出容差只报混合标记。
/// 空输入返回 None。
pub fn uniform_value(values: &[f64], tolerance: f64) -> Option<UniformValue> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min) > tolerance {
        return Some(UniformValue {
            value: None,
            is_mixed: true,
        });
    }
    let sum: f64 = values.iter().sum();
    Some(UniformValue {
        value: Some(sum / values.len() as f64),
        is_mixed: false,
    })
}
