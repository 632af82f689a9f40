// ==========================================
// RFCV 转换系统 - 批量编排器
// ==========================================
// 职责: 将单文档管线 (构建→分组→分摊→赋号→输出)
//       在有界 worker 池上并发展开,聚合每文档结果
// 红线: 单文档失败不中断兄弟文档 (continue-on-error 为唯一模式)
// 红线: 结果列表保持输入顺序,与完成顺序无关
// 红线: 取消只丢弃未开始的文档,已完成结果原样保留,
//       绝不暴露半成品记录
// ==========================================

use crate::domain::batch::{BatchResult, DocumentInput, DocumentOutcome};
use crate::domain::record::DocumentRecord;
use crate::engine::distributor::ValueDistributor;
use crate::engine::error::{TransformError, TransformResult};
use crate::engine::grouping::GroupingEngine;
use crate::engine::identity::VinGenerator;
use crate::engine::record_builder::{BuildOptions, RecordBuilder};
use crate::engine::sink::RecordSink;
use crate::repository::sequence_repo::SequenceStore;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// worker 池硬上限
pub const MAX_WORKERS: usize = 16;

// ==========================================
// CancelFlag - 批次取消句柄
// ==========================================

/// 批次取消句柄（可克隆,跨任务共享）
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消: 尚未开始的文档将以 Cancelled 收尾
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ==========================================
// BatchOrchestrator - 批量编排器
// ==========================================

pub struct BatchOrchestrator<S: RecordSink + 'static> {
    builder: Arc<RecordBuilder>,
    store: Arc<SequenceStore>,
    sink: Arc<S>,
    cancel: CancelFlag,
}

impl<S: RecordSink + 'static> BatchOrchestrator<S> {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - builder: 记录构建引擎（含车辆识别配置）
    /// - store: 序列计数器存储（全 worker 共享的唯一可变资源）
    /// - sink: 记录输出协作方
    pub fn new(builder: RecordBuilder, store: Arc<SequenceStore>, sink: Arc<S>) -> Self {
        Self {
            builder: Arc::new(builder),
            store,
            sink,
            cancel: CancelFlag::new(),
        }
    }

    /// 取消句柄（供调用方中途叫停批次）
    pub fn cancel_handle(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// 执行批量转换
    ///
    /// # 参数
    /// - `documents`: 有序文档输入（各自携带汇率/赋号配置）
    /// - `worker_limit`: worker 池上限（[1, MAX_WORKERS]）
    ///
    /// # 返回
    /// BatchResult: 每文档结果按输入顺序排列 + 汇总计数
    pub async fn run_batch(
        &self,
        documents: Vec<DocumentInput>,
        worker_limit: usize,
    ) -> TransformResult<BatchResult> {
        if worker_limit == 0 || worker_limit > MAX_WORKERS {
            return Err(TransformError::InvalidWorkerLimit {
                requested: worker_limit,
                max: MAX_WORKERS,
            });
        }

        let job_id = Uuid::new_v4();
        let total = documents.len();
        let started = Instant::now();

        info!(
            job_id = %job_id,
            documents = total,
            worker_limit = worker_limit,
            "批量转换开始"
        );

        let semaphore = Arc::new(Semaphore::new(worker_limit));
        let mut handles = Vec::with_capacity(total);

        for (idx, input) in documents.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let builder = self.builder.clone();
            let store = self.store.clone();
            let sink = self.sink.clone();
            let cancel = self.cancel.clone();

            handles.push(tokio::spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        // Semaphore 在批次存续期内不会关闭
                        return (idx, DocumentOutcome::Cancelled);
                    }
                };
                let _permit = permit;

                // 取消检查发生在文档开始之前:
                // 已在执行的文档跑完,未开始的干净丢弃
                if cancel.is_cancelled() {
                    debug!(doc_index = idx, "批次已取消,文档跳过");
                    return (idx, DocumentOutcome::Cancelled);
                }

                let reference = input.reference.clone();
                let outcome = match run_pipeline(&builder, &store, &input) {
                    Ok(record) => match sink.write(&reference, &record).await {
                        Ok(()) => DocumentOutcome::Success(Box::new(record)),
                        Err(e) => {
                            error!(doc_index = idx, reference = %reference, error = %e, "记录输出失败");
                            DocumentOutcome::Failed {
                                field: None,
                                message: format!("记录输出失败: {}", e),
                            }
                        }
                    },
                    Err(e) => {
                        warn!(doc_index = idx, reference = %reference, error = %e, "文档转换失败");
                        DocumentOutcome::Failed {
                            field: e.field().map(|f| f.to_string()),
                            message: e.to_string(),
                        }
                    }
                };

                (idx, outcome)
            }));
        }

        // 汇合: 按输入下标回填,结果顺序与完成顺序解耦
        let mut outcomes: Vec<DocumentOutcome> = vec![DocumentOutcome::Cancelled; total];
        for (handle_idx, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok((idx, outcome)) => outcomes[idx] = outcome,
                Err(e) => {
                    // worker panic: 该文档记失败,兄弟文档不受影响
                    error!(doc_index = handle_idx, error = %e, "worker 任务异常终止");
                    outcomes[handle_idx] = DocumentOutcome::Failed {
                        field: None,
                        message: format!("worker 任务异常终止: {}", e),
                    };
                }
            }
        }

        let summary = BatchResult::summarize(&outcomes);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            job_id = %job_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            elapsed_ms = elapsed_ms,
            "批量转换完成"
        );

        Ok(BatchResult {
            job_id,
            outcomes,
            summary,
            elapsed_ms,
        })
    }

    /// 单文档管线（不经 worker 池,同步语义; 供调用方单独使用）
    pub fn transform_document(&self, input: &DocumentInput) -> TransformResult<DocumentRecord> {
        run_pipeline(&self.builder, &self.store, input)
    }
}

// ==========================================
// 单文档管线
// ==========================================

/// 执行单文档核心管线: 构建 → 分组 → 分摊 → 赋号
///
/// 纯同步计算 + 序列计数器访问; 无网络、无重试、无超时
/// （这些属于被排除的 I/O 适配层）
fn run_pipeline(
    builder: &RecordBuilder,
    store: &Arc<SequenceStore>,
    input: &DocumentInput,
) -> TransformResult<DocumentRecord> {
    // 步骤1: 记录构建
    let opts = BuildOptions {
        exchange_rate: input.exchange_rate,
        payment_reference: input.payment_reference.clone(),
    };
    let mut record = builder.build(&input.extraction, &opts)?;

    // 步骤2: 分组与件数再计量
    let items = std::mem::take(&mut record.items);
    record.items = GroupingEngine::new().group(items, record.financial.total_packages);

    // 步骤3: 保险分摊（保险缺席时内部整体跳过）
    ValueDistributor::new().apply_insurance(&mut record);

    // 步骤4: 标识赋号（按文档配置,可选）
    if let Some(cfg) = &input.identity_config {
        VinGenerator::new(store.clone()).assign(&mut record, cfg)?;
    }

    Ok(record)
}
