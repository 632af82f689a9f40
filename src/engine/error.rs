// ==========================================
// RFCV 转换系统 - 转换引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: IdentityExhausted 不是错误 —— 超额仅记录
//       warn 日志并不予赋号,处理继续（见标识生成器）
// ==========================================

use thiserror::Error;

/// 转换引擎错误类型
#[derive(Error, Debug)]
pub enum TransformError {
    // ===== 文档解析错误 =====
    #[error("文档字段无法解析 (field={field}): {message}")]
    MalformedDocument { field: String, message: String },

    #[error("数值格式错误 (field={field}): 仅接受 '.' 作为小数分隔符, 实际值 {value}")]
    InvalidNumericFormat { field: String, value: String },

    // ===== 标识生成错误 =====
    #[error("无效的标识生成配置 (field={field}): {message}")]
    InvalidIdentityConfig { field: String, message: String },

    /// 计数器未能持久化 —— 仅该次发号调用失败,
    /// 绝不返回未落盘的标识
    #[error("序列计数器持久化失败: {0}")]
    SequencePersistenceFailure(String),

    // ===== 批量编排错误 =====
    #[error("无效的并发上限: 请求 {requested}, 允许范围 [1, {max}]")]
    InvalidWorkerLimit { requested: usize, max: usize },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransformError {
    /// 便捷构造: 文档字段解析失败
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::MalformedDocument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 出错字段名（批次结果中用于定位）
    pub fn field(&self) -> Option<&str> {
        match self {
            TransformError::MalformedDocument { field, .. } => Some(field),
            TransformError::InvalidNumericFormat { field, .. } => Some(field),
            TransformError::InvalidIdentityConfig { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type TransformResult<T> = Result<T, TransformError>;
