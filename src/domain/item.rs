// ==========================================
// RFCV 转换系统 - 商品行与集装箱实体
// ==========================================
// 职责: 定义 LineItem / ContainerInfo 领域实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

use crate::domain::types::IdentityConfidence;
use serde::{Deserialize, Serialize};

// ==========================================
// 车辆识别提示 (Identity Hint)
// ==========================================

/// 车辆识别提示（税号或关键词启发式的判定结果）
///
/// 带置信度标签而非布尔值:
/// - High: 税号 87 章判定
/// - Low: 仅描述关键词命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityHint {
    pub confidence: IdentityConfidence,
    /// 命中的关键词（税号判定时为 None）
    pub matched_keyword: Option<String>,
}

// ==========================================
// LineItem - 商品行
// ==========================================

/// 申报商品行
///
/// 不变式: 商品行要么携带调用方提供的唯一标识（底盘号）,
/// 要么整体可参与同税号合并 —— 不存在“部分携带”的中间态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 文档内行号（1 起,转换时赋值）
    pub line_no: u32,
    /// 源文档行号（来自表格的行序号字段）
    pub origin_line_no: Option<u32>,
    /// 税号（固定宽度数字串）
    pub hs_code: String,
    /// 货物描述
    pub description: Option<String>,
    /// 申报数量
    pub quantity: f64,
    /// 毛重（kg）
    pub gross_weight_kg: Option<f64>,
    /// 净重（kg）
    pub net_weight_kg: Option<f64>,
    /// FOB 价值（分摊权重）
    pub fob_value: Option<f64>,
    /// 唯一标识（底盘号/VIN）
    pub chassis_number: Option<String>,
    /// 车辆识别提示
    pub identity_hint: Option<IdentityHint>,
    /// 保险分摊额（分摊引擎计算; 保险缺席时保持 None）
    pub insurance_share: Option<i64>,
}

impl LineItem {
    /// 是否携带唯一标识
    ///
    /// 监管规则: 已个体识别的货物必须保持个体申报,
    /// 携带标识的行永不参与合并
    pub fn has_identity(&self) -> bool {
        self.chassis_number
            .as_ref()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    /// 是否具备接收生成标识的资格（有车辆提示且尚无标识）
    pub fn eligible_for_identity(&self) -> bool {
        !self.has_identity() && self.identity_hint.is_some()
    }
}

// ==========================================
// ContainerInfo - 集装箱
// ==========================================

/// 集装箱信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub container_number: String,
    pub seal_number: Option<String>,
    pub type_code: Option<String>,
}
