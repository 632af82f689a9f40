// ==========================================
// RFCV 转换系统 - 车辆识别引擎
// ==========================================
// 职责: 判定商品行是否为可赋 VIN 的车辆
// 规则: 税号 87 章 ⇒ 高置信度;
//       税号缺失/非车辆章时描述关键词命中 ⇒ 低置信度
// 说明: 关键词表是配置数据而非硬编码逻辑,
//       可经配置扩展,算法本身不随之变动
// ==========================================

use crate::domain::item::IdentityHint;
use crate::domain::types::IdentityConfidence;
use tracing::debug;

/// 默认车辆关键词表（法语描述,大写形态）
///
/// 原始清单来自历史单据的经验积累,并不穷尽;
/// 通过配置存储可在不改动算法的前提下扩展
pub const DEFAULT_VEHICLE_KEYWORDS: &[&str] = &[
    "VEHICULE",
    "VOITURE",
    "CAMION",
    "TRACTEUR",
    "REMORQUE",
    "BUS",
    "MINIBUS",
    "BERLINE",
    "PICK-UP",
    "PICKUP",
    "MOTO",
    "MOTOCYCLETTE",
    "SUV",
    "4X4",
];

/// 车辆税号章节前缀（87 章: 车辆及其零件）
const VEHICLE_HS_CHAPTER: &str = "87";

// ==========================================
// VehicleDetector - 车辆识别引擎
// ==========================================

pub struct VehicleDetector {
    keywords: Vec<String>,
}

impl VehicleDetector {
    /// 使用显式关键词表创建（来自配置存储）
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// 使用默认关键词表创建
    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_VEHICLE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        )
    }

    /// 判定单行商品
    ///
    /// # 返回
    /// - `Some(IdentityHint { High, .. })`: 税号为有效 87 章编码
    /// - `Some(IdentityHint { Low, .. })`: 仅描述关键词命中
    /// - `None`: 非车辆行
    pub fn detect(&self, hs_code: &str, description: Option<&str>) -> Option<IdentityHint> {
        if Self::is_vehicle_hs_code(hs_code) {
            return Some(IdentityHint {
                confidence: IdentityConfidence::High,
                matched_keyword: None,
            });
        }

        let upper = description?.to_uppercase();
        for keyword in &self.keywords {
            if upper.contains(keyword.as_str()) {
                debug!(
                    hs_code = hs_code,
                    keyword = %keyword,
                    "关键词命中,低置信度车辆判定"
                );
                return Some(IdentityHint {
                    confidence: IdentityConfidence::Low,
                    matched_keyword: Some(keyword.clone()),
                });
            }
        }

        None
    }

    /// 税号是否为有效的车辆章编码（8 位数字且以 87 开头）
    fn is_vehicle_hs_code(hs_code: &str) -> bool {
        let trimmed = hs_code.trim();
        trimmed.len() == 8
            && trimmed.chars().all(|c| c.is_ascii_digit())
            && trimmed.starts_with(VEHICLE_HS_CHAPTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_hs_code_is_high_confidence() {
        let detector = VehicleDetector::with_defaults();
        let hint = detector.detect("87032319", None).unwrap();
        assert_eq!(hint.confidence, IdentityConfidence::High);
        assert_eq!(hint.matched_keyword, None);
    }

    #[test]
    fn test_keyword_is_low_confidence() {
        let detector = VehicleDetector::with_defaults();
        let hint = detector
            .detect("84089000", Some("VEHICULE UTILITAIRE OCCASION"))
            .unwrap();
        assert_eq!(hint.confidence, IdentityConfidence::Low);
        assert_eq!(hint.matched_keyword.as_deref(), Some("VEHICULE"));
    }

    #[test]
    fn test_non_vehicle_is_none() {
        let detector = VehicleDetector::with_defaults();
        assert!(detector.detect("84089000", Some("MOTEUR DIESEL")).is_none());
        // 非 8 位的 87 前缀不算有效车辆税号
        assert!(detector.detect("87", None).is_none());
    }

    #[test]
    fn test_configured_keywords_extend_detection() {
        let detector = VehicleDetector::new(vec!["AMBULANCE".to_string()]);
        assert!(detector.detect("84089000", Some("AMBULANCE 4X2")).is_some());
        // 默认表不再生效
        assert!(detector.detect("84089000", Some("VOITURE")).is_none());
    }
}
