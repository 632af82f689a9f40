// ==========================================
// RFCV 转换系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: RFCV 报告结构化转换与批量编排引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 序列计数器持久化
pub mod repository;

// 抽取层 - 原始字段/表格定位
pub mod extractor;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FlushPolicy, IdentityConfidence, TraderRole, TransportMode};

// 领域实体
pub use domain::{
    BatchResult, BatchSummary, ContainerInfo, DocumentInput, DocumentOutcome, DocumentRecord,
    IdentityConfig, LineItem, RawExtraction, RawPage, RawTable,
};

// 引擎
pub use engine::{
    BatchOrchestrator, CancelFlag, GroupingEngine, RecordBuilder, ValueDistributor,
    VehicleDetector, VinGenerator,
};

// 抽取器
pub use extractor::FieldExtractor;

// 仓储
pub use repository::{SequenceKey, SequenceStore};

// API
pub use api::{ApiError, ApiResult, TransformApi};

// ==========================================
// 系统常量
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "RFCV 转换系统";

// 序列存储 schema 版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
