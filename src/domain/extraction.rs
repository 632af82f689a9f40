// ==========================================
// RFCV 转换系统 - 原始提取中间形态
// ==========================================
// 职责: 定义 PDF 文本提取协作方与核心之间的数据边界
// 说明: 核心不需要任何几何/坐标元数据,
//       只消费按页有序的文本行与已检测的表格
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// 提取协作方输入
// ==========================================

/// 单页文本行（由外部 PDF 提取协作方提供）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    /// 页内有序文本行
    pub lines: Vec<String>,
}

/// 已检测的表格（单元格字符串矩阵,首行为表头）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

// ==========================================
// 字段提取器输出
// ==========================================

/// 商品行的原始字符串形态
///
/// 提取阶段只定位与标准化,不做类型转换;
/// 数值/日期解析由 RecordBuilder 负责
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawItemRow {
    /// 税号（position tarifaire）
    pub hs_code: Option<String>,
    /// 货物描述
    pub description: Option<String>,
    /// 申报数量
    pub quantity: Option<String>,
    /// 毛重（kg）
    pub gross_weight: Option<String>,
    /// 净重（kg）
    pub net_weight: Option<String>,
    /// FOB 价值
    pub fob_value: Option<String>,
    /// 底盘号/VIN
    pub chassis_number: Option<String>,
    /// 源表行号（源文档内的行序号字段）
    pub origin_line_no: Option<String>,
    /// 表内物理行号（1 起,用于错误定位）
    pub row_number: usize,
}

/// 集装箱行的原始字符串形态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContainerRow {
    pub container_number: Option<String>,
    pub seal_number: Option<String>,
    pub type_code: Option<String>,
    pub row_number: usize,
}

/// 字段提取器的统一输出
///
/// - `fields`: 标准键（snake_case）→ 标准化后的字段值
/// - `item_rows` / `container_rows`: 已定位的表格行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExtraction {
    pub fields: HashMap<String, String>,
    pub item_rows: Vec<RawItemRow>,
    pub container_rows: Vec<RawContainerRow>,
}

impl RawExtraction {
    /// 读取标准字段（空值视为缺失）
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }
}
