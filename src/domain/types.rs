// ==========================================
// RFCV 转换系统 - 领域类型定义
// ==========================================
// 职责: 定义跨模块共享的枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与落盘格式一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 贸易方角色 (Trader Role)
// ==========================================
// RFCV 固定模板: 出口商 / 进口商 / 报关行 三方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraderRole {
    Exporter,  // 出口商
    Importer,  // 进口商
    Declarant, // 报关行
}

impl fmt::Display for TraderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraderRole::Exporter => write!(f, "EXPORTER"),
            TraderRole::Importer => write!(f, "IMPORTER"),
            TraderRole::Declarant => write!(f, "DECLARANT"),
        }
    }
}

// ==========================================
// 运输方式 (Transport Mode)
// ==========================================
// 源字段为法语文本,解析失败时保留 Other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Maritime,      // 海运 (MARITIME)
    Air,           // 空运 (AERIEN)
    Road,          // 陆运 (ROUTIER)
    Rail,          // 铁路 (FERROVIAIRE)
    Other(String), // 未识别的原始文本
}

impl TransportMode {
    /// 从源文本解析运输方式（大小写不敏感，输入应已标准化）
    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "MARITIME" | "MER" => TransportMode::Maritime,
            "AERIEN" | "AIR" => TransportMode::Air,
            "ROUTIER" | "ROUTE" => TransportMode::Road,
            "FERROVIAIRE" | "RAIL" => TransportMode::Rail,
            other => TransportMode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Maritime => write!(f, "MARITIME"),
            TransportMode::Air => write!(f, "AERIEN"),
            TransportMode::Road => write!(f, "ROUTIER"),
            TransportMode::Rail => write!(f, "FERROVIAIRE"),
            TransportMode::Other(raw) => write!(f, "{}", raw),
        }
    }
}

// ==========================================
// 车辆识别置信度 (Identity Confidence)
// ==========================================
// 税号 87 章命中为高置信度; 仅关键词命中为低置信度
// 调用方可据此对低置信度结果采取不同动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityConfidence {
    High, // 税号判定
    Low,  // 关键词启发式判定
}

impl fmt::Display for IdentityConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityConfidence::High => write!(f, "HIGH"),
            IdentityConfidence::Low => write!(f, "LOW"),
        }
    }
}

// ==========================================
// 序列计数器落盘策略 (Flush Policy)
// ==========================================
// 本版本仅支持逐次落盘: 每次发号前计数器已提交,
// 崩溃只会跳号（可接受）,绝不重号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// 每次发号同步提交（默认,唯一受支持的策略）
    PerIssuance,
    /// 批量落盘（保留配置面,构造存储时会被拒绝）
    Batched { every: u32 },
}

impl fmt::Display for FlushPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushPolicy::PerIssuance => write!(f, "per_issuance"),
            FlushPolicy::Batched { every } => write!(f, "batched({})", every),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mode_parse() {
        assert_eq!(TransportMode::parse("Maritime"), TransportMode::Maritime);
        assert_eq!(TransportMode::parse("AERIEN"), TransportMode::Air);
        assert_eq!(
            TransportMode::parse("PIPELINE"),
            TransportMode::Other("PIPELINE".to_string())
        );
    }
}
