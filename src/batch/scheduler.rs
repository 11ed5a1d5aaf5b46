//! # 批量调度器
//!
//! 在有界线程池上并行处理全部工作项。
//!
//! ## 功能
//! - 基于 rayon 线程池的固定数量工作线程，从共享游标领取文件
//! - 同时处理的文件数不超过并发上限 `T`
//! - 每个文件完成后写入结果汇总器并推进进度跟踪器
//! - 处理器失败（`Err` / panic）转换为失败记录，不影响其他文件
//! - 可选的失败重试与取消
//!
//! ## 依赖关系
//! - 被 `commands/optimize.rs` 调用
//! - 使用 `batch/progress.rs`, `batch/aggregator.rs`, `batch/isolation.rs`
//! - 使用 `rayon` 构建线程池

use super::aggregator::{ResultAggregator, SummaryContext};
use super::cancel::CancellationToken;
use super::isolation;
use super::progress::{ProgressFn, ProgressTracker};
use crate::error::{PixbatchError, Result};
use crate::models::{BatchSummary, ProcessingOutcome, ProcessingResult, ProgressSnapshot, WorkItem};

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// 取消后未派发文件的错误信息
pub const CANCELLED_MESSAGE: &str = "cancelled before dispatch";

/// 批量调度器
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    /// 并发上限
    throttle_limit: usize,
    /// 失败后的额外尝试次数
    max_retries: u32,
    cancel: CancellationToken,
}

impl BatchScheduler {
    /// 创建调度器，`throttle_limit` 必须 >= 1
    pub fn new(throttle_limit: usize) -> Result<Self> {
        if throttle_limit == 0 {
            return Err(PixbatchError::InvalidThrottleLimit(throttle_limit));
        }
        Ok(Self {
            throttle_limit,
            max_retries: 0,
            cancel: CancellationToken::new(),
        })
    }

    /// 设置失败重试次数
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 使用外部取消令牌
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// 处理全部工作项
    pub fn run<P>(&self, items: &[WorkItem], processor: P) -> Result<BatchSummary>
    where
        P: Fn(&WorkItem) -> anyhow::Result<ProcessingOutcome> + Sync,
    {
        self.execute(items, &processor, None)
    }

    /// 处理全部工作项，并在每个文件完成后调用进度回调
    pub fn run_with_progress<P, C>(
        &self,
        items: &[WorkItem],
        processor: P,
        callback: C,
    ) -> Result<BatchSummary>
    where
        P: Fn(&WorkItem) -> anyhow::Result<ProcessingOutcome> + Sync,
        C: Fn(&ProgressSnapshot) -> anyhow::Result<()> + Sync,
    {
        let callback: &ProgressFn<'_> = &callback;
        self.execute(items, &processor, Some(callback))
    }

    fn execute<P>(
        &self,
        items: &[WorkItem],
        processor: &P,
        callback: Option<&ProgressFn<'_>>,
    ) -> Result<BatchSummary>
    where
        P: Fn(&WorkItem) -> anyhow::Result<ProcessingOutcome> + Sync,
    {
        if items.is_empty() {
            debug!("no work items, returning empty summary");
            return Ok(BatchSummary::empty(self.throttle_limit));
        }

        let threads_used = self.throttle_limit.min(items.len());

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads_used)
            .thread_name(|i| format!("pixbatch-worker-{}", i))
            .build()
            .map_err(|e| PixbatchError::Other(format!("Failed to build worker pool: {}", e)))?;

        debug!(
            items = items.len(),
            threads = threads_used,
            throttle_limit = self.throttle_limit,
            "dispatching batch"
        );

        let tracker = ProgressTracker::new(items.len(), callback);
        let aggregator = ResultAggregator::with_capacity(items.len());
        let next_index = AtomicUsize::new(0);

        pool.scope(|scope| {
            for worker_id in 0..threads_used {
                let tracker = &tracker;
                let aggregator = &aggregator;
                let next_index = &next_index;
                scope.spawn(move |_| {
                    self.worker_loop(worker_id, items, processor, tracker, aggregator, next_index)
                });
            }
        });

        let elapsed = tracker.elapsed();
        let summary = aggregator.into_summary(SummaryContext {
            threads_used,
            throttle_limit: self.throttle_limit,
            elapsed,
            cancelled: self.cancel.is_cancelled(),
        });

        info!(
            total = summary.total_processed,
            success = summary.success_count,
            failed = summary.error_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch completed"
        );

        Ok(summary)
    }

    /// 单个工作线程：循环领取下一个文件直到队列耗尽
    fn worker_loop<P>(
        &self,
        worker_id: usize,
        items: &[WorkItem],
        processor: &P,
        tracker: &ProgressTracker<'_>,
        aggregator: &ResultAggregator,
        next_index: &AtomicUsize,
    ) where
        P: Fn(&WorkItem) -> anyhow::Result<ProcessingOutcome> + Sync,
    {
        debug!(worker_id, "worker started");
        let mut handled = 0usize;

        loop {
            let index = next_index.fetch_add(1, Ordering::SeqCst);
            let Some(item) = items.get(index) else {
                break;
            };

            let result = if self.cancel.is_cancelled() {
                ProcessingResult::failed(item, CANCELLED_MESSAGE, worker_id)
            } else {
                let outcome = self.process_with_retry(item, processor);
                ProcessingResult::from_outcome(item, outcome, worker_id)
            };

            let file_name = result.file_name.clone();
            aggregator.record(index, result);
            tracker.record(&file_name);
            handled += 1;
        }

        debug!(worker_id, handled, "worker finished");
    }

    /// 调用处理器，失败时最多重试 `max_retries` 次
    fn process_with_retry<P>(&self, item: &WorkItem, processor: &P) -> ProcessingOutcome
    where
        P: Fn(&WorkItem) -> anyhow::Result<ProcessingOutcome> + Sync,
    {
        let mut attempt = 0u32;
        loop {
            let outcome = isolation::run_processor(processor, item);
            if outcome.success || attempt >= self.max_retries || self.cancel.is_cancelled() {
                return outcome;
            }
            attempt += 1;
            debug!(
                file = %item.source.display(),
                attempt,
                max_retries = self.max_retries,
                "retrying failed item"
            );
        }
    }
}
