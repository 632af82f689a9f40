// ==========================================
// RFCV 转换系统 - 记录输出 trait
// ==========================================
// 职责: 定义 XML 序列化协作方的接入缝
// 说明: Engine 层定义 trait,序列化层实现适配器,
//       实现依赖倒置 —— 核心不依赖任何序列化细节
// ==========================================

use crate::domain::record::DocumentRecord;
use async_trait::async_trait;

/// 记录输出协作方
///
/// 管线在单文档核心阶段完成后,将完整记录交给实现方;
/// "字段刻意留空"的表达约定（如空元素标记）由实现方自理
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// 输出单条完整记录
    ///
    /// # 参数
    /// - `reference`: 调用方的文档引用（用于落盘命名/对账）
    /// - `record`: 管线完成后的完整记录
    async fn write(
        &self,
        reference: &str,
        record: &DocumentRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// 空实现: 不做任何输出
///
/// 供测试与"调用方另行序列化"的场景使用
pub struct NullSink;

#[async_trait]
impl RecordSink for NullSink {
    async fn write(
        &self,
        _reference: &str,
        _record: &DocumentRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
