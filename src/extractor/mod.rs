// ==========================================
// RFCV 转换系统 - 字段提取层
// ==========================================
// 职责: 将外部提取协作方提供的文本行/表格
//       转换为扁平 键→值 与表格中间形态
// 红线: 只定位与标准化,不做类型转换
// ==========================================

pub mod field_locator;
pub mod normalizer;
pub mod table_reader;

pub use field_locator::FieldLocator;
pub use table_reader::TableReader;

use crate::domain::extraction::{RawExtraction, RawPage, RawTable};
use tracing::info;

// ==========================================
// FieldExtractor - 字段提取器
// ==========================================

/// 字段提取器: 定位器与表格读取器的组合入口
pub struct FieldExtractor {
    locator: FieldLocator,
    table_reader: TableReader,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            locator: FieldLocator::new(),
            table_reader: TableReader::new(),
        }
    }

    /// 执行提取: 页面文本 + 表格 → RawExtraction
    ///
    /// 全函数无失败路径: 定位不到的字段缺席,
    /// 缺失字段的后果（必填/可选）由 RecordBuilder 判定
    pub fn extract(&self, pages: &[RawPage], tables: &[RawTable]) -> RawExtraction {
        let fields = self.locator.locate(pages);
        let (item_rows, container_rows) = self.table_reader.read(tables);

        info!(
            fields = fields.len(),
            item_rows = item_rows.len(),
            container_rows = container_rows.len(),
            "字段提取完成"
        );

        RawExtraction {
            fields,
            item_rows,
            container_rows,
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}
