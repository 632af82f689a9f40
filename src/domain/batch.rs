// ==========================================
// RFCV 转换系统 - 批量作业实体
// ==========================================
// 职责: 定义批量编排的输入/结果结构
// 红线: 结果聚合结构由编排器持有并返回调用方,
//       不存在进程级可变单例
// ==========================================

use crate::domain::extraction::RawExtraction;
use crate::domain::record::DocumentRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// IdentityConfig - 标识生成配置
// ==========================================

/// 单文档的标识生成配置
///
/// 键四元组 (wmi, vds, 年份, 工厂码) 决定序列计数器的作用域
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// 制造商代码（3 位）
    pub wmi: String,
    /// 描述段代码（5 位）
    pub vds: String,
    /// 车型年份（映射为单字符年份码）
    pub model_year: i32,
    /// 工厂码（1 位）
    pub plant_code: char,
    /// 申请生成的标识数量
    pub quantity: u32,
}

// ==========================================
// DocumentInput - 单文档输入
// ==========================================

/// 批量作业中的单文档输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    /// 调用方的文档引用（文件名/业务号,用于结果定位）
    pub reference: String,
    /// 提取中间形态
    pub extraction: RawExtraction,
    /// 该文档使用的汇率（强制）
    pub exchange_rate: f64,
    /// 付款参考号（可选,原样存储）
    pub payment_reference: Option<String>,
    /// 标识生成配置（可选）
    pub identity_config: Option<IdentityConfig>,
}

// ==========================================
// DocumentOutcome - 单文档结果
// ==========================================

/// 单文档转换结果
///
/// 失败不中断兄弟文档（continue-on-error 为唯一模式）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentOutcome {
    /// 转换成功
    Success(Box<DocumentRecord>),
    /// 转换失败（记录首个出错字段与原因）
    Failed {
        field: Option<String>,
        message: String,
    },
    /// 批次取消时尚未开始的文档
    Cancelled,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentOutcome::Failed { .. })
    }
}

// ==========================================
// BatchResult - 批次结果
// ==========================================

/// 批次汇总计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// 批次结果
///
/// `outcomes` 与输入文档一一对应且保持输入顺序,
/// 与完成顺序无关
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// 批次作业 ID
    pub job_id: Uuid,
    /// 每文档结果（输入顺序）
    pub outcomes: Vec<DocumentOutcome>,
    /// 汇总计数
    pub summary: BatchSummary,
    /// 批次耗时（毫秒）
    pub elapsed_ms: u64,
}

impl BatchResult {
    /// 依据结果列表重算汇总计数
    pub fn summarize(outcomes: &[DocumentOutcome]) -> BatchSummary {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                DocumentOutcome::Success(_) => summary.succeeded += 1,
                DocumentOutcome::Failed { .. } => summary.failed += 1,
                DocumentOutcome::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }
}
