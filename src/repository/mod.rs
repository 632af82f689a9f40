// ==========================================
// RFCV 转换系统 - 数据仓储层
// ==========================================
// 职责: 持久化状态的数据访问
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

pub mod error;
pub mod sequence_repo;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use sequence_repo::{ReservedRange, SequenceKey, SequenceStore, MAX_SEQUENCE};
