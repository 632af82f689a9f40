// ==========================================
// RFCV 转换系统 - 配置读取 trait
// ==========================================
// 职责: 定义引擎所需配置的读取接口
// 说明: Engine/API 层依赖此 trait 而非具体存储,
//       便于测试时注入内存实现
// ==========================================

use crate::domain::types::FlushPolicy;
use async_trait::async_trait;

/// 配置读取错误（配置层统一对外形态）
pub type ConfigError = Box<dyn std::error::Error + Send + Sync>;

/// 转换配置读取器
#[async_trait]
pub trait TransformConfigReader: Send + Sync {
    /// 车辆识别关键词表
    ///
    /// 键缺失时返回内置默认表; 关键词是配置数据,
    /// 扩展不触及识别算法
    async fn vehicle_keywords(&self) -> Result<Vec<String>, ConfigError>;

    /// 默认 worker 池上限（调用方未显式指定时采用）
    async fn default_worker_limit(&self) -> Result<usize, ConfigError>;

    /// 序列计数器落盘策略
    async fn flush_policy(&self) -> Result<FlushPolicy, ConfigError>;
}
