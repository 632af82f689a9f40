// ==========================================
// RFCV 转换系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供外部调用方（CLI/服务）集成
// ==========================================

pub mod error;
pub mod transform_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use transform_api::TransformApi;
