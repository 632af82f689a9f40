// ==========================================
// RFCV 转换系统 - 配置模块
// ==========================================

pub mod config_manager;
pub mod transform_config_trait;

pub use config_manager::{
    ConfigManager, KEY_DEFAULT_WORKER_LIMIT, KEY_FLUSH_POLICY, KEY_VEHICLE_KEYWORDS,
};
pub use transform_config_trait::{ConfigError, TransformConfigReader};
