// ==========================================
// RFCV 转换系统 - 转换 API
// ==========================================
// 职责: 对外统一入口,组装配置/引擎/仓储,提供单文档与批量转换
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::transform_config_trait::TransformConfigReader;
use crate::domain::batch::{BatchResult, DocumentInput};
use crate::domain::record::DocumentRecord;
use crate::engine::orchestrator::{BatchOrchestrator, CancelFlag};
use crate::engine::record_builder::RecordBuilder;
use crate::engine::sink::RecordSink;
use crate::engine::vehicle_detector::VehicleDetector;
use crate::repository::sequence_repo::SequenceStore;

// ==========================================
// TransformApi - 转换 API
// ==========================================

/// 转换API
///
/// 职责：
/// 1. 单文档转换（同步管线）
/// 2. 批量转换（并发调度 + 取消）
/// 3. 配置注入（关键词表、默认并发上限）
pub struct TransformApi<S: RecordSink + 'static> {
    config: Arc<dyn TransformConfigReader>,
    orchestrator: BatchOrchestrator<S>,
}

impl<S: RecordSink + 'static> TransformApi<S> {
    /// 创建新的TransformApi实例
    ///
    /// 构造时读取一次关键词配置；后续配置变更需重建实例。
    ///
    /// # 参数
    /// - config: 配置读取器
    /// - store: 序列计数器存储
    /// - sink: 转换结果落地目标
    pub async fn new(
        config: Arc<dyn TransformConfigReader>,
        store: Arc<SequenceStore>,
        sink: Arc<S>,
    ) -> ApiResult<Self> {
        let keywords = config
            .vehicle_keywords()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let builder = RecordBuilder::new(VehicleDetector::new(keywords));
        let orchestrator = BatchOrchestrator::new(builder, store, sink);

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 单文档转换
    ///
    /// # 返回
    /// - Ok(DocumentRecord): 规范化文档（已分组、已分摊、已赋号）
    /// - Err(ApiError): 首个阻断性字段错误
    pub fn build_record(&self, input: &DocumentInput) -> ApiResult<DocumentRecord> {
        let record = self.orchestrator.transform_document(input)?;
        Ok(record)
    }

    /// 批量转换
    ///
    /// # 参数
    /// - documents: 有序文档输入
    /// - worker_limit: 并发上限,None 时取配置默认值
    ///
    /// # 返回
    /// BatchResult: 按输入顺序排列的每文档结果 + 汇总计数
    pub async fn run_batch(
        &self,
        documents: Vec<DocumentInput>,
        worker_limit: Option<usize>,
    ) -> ApiResult<BatchResult> {
        let limit = match worker_limit {
            Some(limit) => limit,
            None => self
                .config
                .default_worker_limit()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        };

        info!(documents = documents.len(), worker_limit = limit, "批量转换请求");

        let result = self.orchestrator.run_batch(documents, limit).await?;
        Ok(result)
    }

    /// 获取取消句柄（可跨线程触发）
    pub fn cancel_handle(&self) -> CancelFlag {
        self.orchestrator.cancel_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_manager::ConfigManager;
    use crate::engine::sink::NullSink;

    #[tokio::test]
    async fn test_api_uses_configured_default_worker_limit() {
        let config = Arc::new(ConfigManager::new_in_memory().unwrap());
        config
            .set_global_config_value(crate::config::KEY_DEFAULT_WORKER_LIMIT, "2")
            .unwrap();
        let store = Arc::new(SequenceStore::open_in_memory().unwrap());

        let api = TransformApi::new(config, store, Arc::new(NullSink))
            .await
            .unwrap();

        let result = api.run_batch(Vec::new(), None).await.unwrap();
        assert_eq!(result.summary.total, 0);
    }
}
