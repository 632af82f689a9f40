// ==========================================
// RFCV 转换系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换下层技术错误为用户友好的错误消息
// 要求: 所有错误信息包含显式原因与定位字段
// ==========================================

use crate::engine::error::TransformError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 文档内容问题（带定位字段,供人工复核）
    #[error("文档转换失败 (field={field}): {message}")]
    DocumentError { field: String, message: String },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::InvalidSequenceKey { field, message } => {
                ApiError::InvalidInput(format!("序列键无效 (field={}): {}", field, message))
            }
            RepositoryError::UnsupportedFlushPolicy(policy) => {
                ApiError::InvalidInput(format!("不支持的落盘策略: {}", policy))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从 TransformError 转换
// ==========================================
impl From<TransformError> for ApiError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::MalformedDocument { field, message } => {
                ApiError::DocumentError { field, message }
            }
            TransformError::InvalidNumericFormat { field, value } => ApiError::DocumentError {
                field,
                message: format!("数值格式错误,仅接受 '.' 作为小数分隔符: {}", value),
            },
            TransformError::InvalidIdentityConfig { field, message } => {
                ApiError::InvalidInput(format!("标识生成配置无效 (field={}): {}", field, message))
            }
            TransformError::SequencePersistenceFailure(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            TransformError::InvalidWorkerLimit { requested, max } => ApiError::InvalidInput(
                format!("无效的并发上限: 请求 {}, 允许范围 [1, {}]", requested, max),
            ),
            TransformError::InternalError(msg) => ApiError::InternalError(msg),
            TransformError::Other(e) => ApiError::Other(e),
        }
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
