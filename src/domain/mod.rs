// ==========================================
// RFCV 转换系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与数据边界
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod batch;
pub mod extraction;
pub mod item;
pub mod record;
pub mod types;

// 重导出核心类型
pub use batch::{
    BatchResult, BatchSummary, DocumentInput, DocumentOutcome, IdentityConfig,
};
pub use extraction::{RawContainerRow, RawExtraction, RawItemRow, RawPage, RawTable};
pub use item::{ContainerInfo, IdentityHint, LineItem};
pub use record::{
    DocumentRecord, Financial, Identification, Trader, Transport, Valuation,
};
pub use types::{FlushPolicy, IdentityConfidence, TraderRole, TransportMode};
