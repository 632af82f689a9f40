// ==========================================
// RFCV 转换系统 - 文档记录聚合根
// ==========================================
// 职责: 定义 DocumentRecord 及其组成块
// 生命周期: 每次文档转换创建一次,
//           管线各阶段就地修改,管线完成后视为不可变
// ==========================================

use crate::domain::item::{ContainerInfo, LineItem};
use crate::domain::types::{TraderRole, TransportMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Identification - 文档标识块
// ==========================================

/// 文档标识信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    /// RFCV 编号
    pub rfcv_number: String,
    /// 签发日期
    pub issue_date: NaiveDate,
    /// FDI 编号（进口申报单）
    pub fdi_number: String,
    /// 贸易术语（INCOTERM）
    pub incoterm: Option<String>,
}

// ==========================================
// Trader - 贸易方
// ==========================================

/// 贸易方条目（出口商/进口商/报关行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trader {
    pub role: TraderRole,
    pub name: Option<String>,
    pub code: Option<String>,
}

// ==========================================
// Transport - 运输块
// ==========================================

/// 运输信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    pub mode: Option<TransportMode>,
    /// 船名/航班
    pub vessel_name: Option<String>,
    /// 提单号
    pub bill_of_lading: Option<String>,
    /// 原产国
    pub country_of_origin: Option<String>,
    /// 起运国
    pub country_of_provenance: Option<String>,
}

// ==========================================
// Financial - 财务块
// ==========================================

/// 财务信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financial {
    /// 付款参考号
    ///
    /// 调用方提供时原样存储; 未提供时为**空串**而非 None,
    /// 以便下游系统后续人工补录
    pub payment_reference: String,
    /// 币种
    pub currency: Option<String>,
    /// 申报总件数（汇总字段,分组引擎的再计量输入）
    pub total_packages: Option<u32>,
    /// 总毛重（kg）
    pub gross_weight_kg: Option<f64>,
}

// ==========================================
// Valuation - 估价块
// ==========================================

/// 估价信息
///
/// 不变式: `insurance` 为 Some 当且仅当计算时
/// FOB、运费、汇率三者均存在且为正
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// FOB 总值
    pub fob_total: Option<f64>,
    /// 运费总值
    pub freight_total: Option<f64>,
    /// 计算保险额（整数,ceiling 后）; 输入缺失时为 None
    pub insurance: Option<i64>,
    /// 使用的汇率（调用方提供,强制）
    pub exchange_rate: f64,
}

// ==========================================
// DocumentRecord - 聚合根
// ==========================================

/// RFCV 文档的结构化记录
///
/// 聚合根: 持有全部组成块、有序商品行与集装箱序列。
/// 对外暴露给 XML 序列化协作方时,所有可选字段
/// 要么已赋值要么显式缺席（serde 的 None 表达）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub identification: Identification,
    pub traders: Vec<Trader>,
    pub transport: Transport,
    pub financial: Financial,
    pub valuation: Valuation,
    pub items: Vec<LineItem>,
    pub containers: Vec<ContainerInfo>,
}

impl DocumentRecord {
    /// 按角色查找贸易方
    pub fn trader(&self, role: TraderRole) -> Option<&Trader> {
        self.traders.iter().find(|t| t.role == role)
    }

    /// 携带唯一标识的商品行数量
    pub fn identified_item_count(&self) -> usize {
        self.items.iter().filter(|i| i.has_identity()).count()
    }
}
