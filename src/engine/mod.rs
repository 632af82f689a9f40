// ==========================================
// RFCV 转换系统 - 引擎层
// ==========================================
// 职责: 实现转换业务规则引擎
// 红线: Engine 不拼 SQL; 所有拒绝都必须可解释（带字段名）
// ==========================================

pub mod distributor;
pub mod error;
pub mod grouping;
pub mod identity;
pub mod numeric;
pub mod orchestrator;
pub mod record_builder;
pub mod sink;
pub mod vehicle_detector;

// 重导出核心引擎
pub use distributor::ValueDistributor;
pub use error::{TransformError, TransformResult};
pub use grouping::GroupingEngine;
pub use identity::{
    compute_check_digit, validate_check_digit, year_code, VinGenerator, CHECK_DIGIT_INDEX,
    VIN_ALPHABET, VIN_LENGTH,
};
pub use orchestrator::{BatchOrchestrator, CancelFlag, MAX_WORKERS};
pub use record_builder::{BuildOptions, RecordBuilder};
pub use sink::{NullSink, RecordSink};
pub use vehicle_detector::{VehicleDetector, DEFAULT_VEHICLE_KEYWORDS};
