// ==========================================
// RFCV 转换系统 - 严格数值解析与保险计算
// ==========================================
// 红线: 小数分隔符仅接受 '.',出现 ',' 一律拒绝
//       —— 这是刻意的严格策略,不是本地化适配层
// ==========================================

use crate::engine::error::{TransformError, TransformResult};
use tracing::debug;

/// 保险公式常数项
pub const INSURANCE_BASE: f64 = 2_500.0;

/// 保险费率系数
pub const INSURANCE_RATE_FACTOR: f64 = 0.001_5;

// ==========================================
// 严格数值解析
// ==========================================

/// 严格解析十进制数
///
/// # 规则
/// - `.` 为唯一合法小数分隔符
/// - 出现 `,` ⇒ InvalidNumericFormat（即使是千分位用法）
/// - 非有限值（NaN/inf）⇒ InvalidNumericFormat
pub fn parse_strict_decimal(field: &str, value: &str) -> TransformResult<f64> {
    let trimmed = value.trim();

    if trimmed.contains(',') {
        return Err(TransformError::InvalidNumericFormat {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| TransformError::InvalidNumericFormat {
            field: field.to_string(),
            value: value.to_string(),
        })?;

    if !parsed.is_finite() {
        return Err(TransformError::InvalidNumericFormat {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    Ok(parsed)
}

/// 解析可选十进制数（缺失/空白 ⇒ None,格式错误仍报错）
pub fn parse_optional_decimal(field: &str, value: Option<&str>) -> TransformResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => parse_strict_decimal(field, v).map(Some),
    }
}

/// 严格解析非负整数（件数/行号等汇总字段）
pub fn parse_strict_u32(field: &str, value: &str) -> TransformResult<u32> {
    let trimmed = value.trim();

    if trimmed.contains(',') || trimmed.contains('.') {
        return Err(TransformError::InvalidNumericFormat {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    trimmed
        .parse()
        .map_err(|_| TransformError::InvalidNumericFormat {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// 解析可选非负整数
pub fn parse_optional_u32(field: &str, value: Option<&str>) -> TransformResult<Option<u32>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => parse_strict_u32(field, v).map(Some),
    }
}

// ==========================================
// 保险计算
// ==========================================

/// 计算保险额: `ceiling(2500 + (FOB + FRET) × 汇率 × 0.0015)`
///
/// # 返回
/// - `Some(i64)`: FOB、运费、汇率均存在且为正
/// - `None`: 任一输入缺失、为零或非正 —— 下游分摊整体跳过
pub fn compute_insurance(
    fob_total: Option<f64>,
    freight_total: Option<f64>,
    exchange_rate: f64,
) -> Option<i64> {
    let fob = fob_total.filter(|v| *v > 0.0 && v.is_finite())?;
    let freight = freight_total.filter(|v| *v > 0.0 && v.is_finite())?;
    if exchange_rate <= 0.0 || !exchange_rate.is_finite() {
        return None;
    }

    let raw = INSURANCE_BASE + (fob + freight) * exchange_rate * INSURANCE_RATE_FACTOR;
    let insurance = raw.ceil() as i64;

    debug!(
        fob = fob,
        freight = freight,
        rate = exchange_rate,
        raw = raw,
        insurance = insurance,
        "保险额计算完成"
    );

    Some(insurance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_decimal_accepts_dot() {
        assert_eq!(parse_strict_decimal("rate", "573.139").unwrap(), 573.139);
    }

    #[test]
    fn test_strict_decimal_rejects_comma() {
        let err = parse_strict_decimal("rate", "573,139").unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidNumericFormat { .. }
        ));
    }

    #[test]
    fn test_strict_decimal_rejects_non_finite() {
        assert!(parse_strict_decimal("x", "inf").is_err());
        assert!(parse_strict_decimal("x", "NaN").is_err());
    }

    #[test]
    fn test_insurance_reference_scenario() {
        // FOB=12683.65, FRET=2000, 汇率=573.139
        // raw = 2500 + 14683.65 × 573.139 × 0.0015 = 15123.658... ⇒ ceiling 15124
        let insurance = compute_insurance(Some(12_683.65), Some(2_000.0), 573.139);
        assert_eq!(insurance, Some(15_124));
    }

    #[test]
    fn test_insurance_missing_or_zero_input_is_none() {
        assert_eq!(compute_insurance(None, Some(2_000.0), 573.139), None);
        assert_eq!(compute_insurance(Some(0.0), Some(2_000.0), 573.139), None);
        assert_eq!(compute_insurance(Some(1.0), Some(1.0), 0.0), None);
    }
}
