//! # 结果汇总器
//!
//! 线程安全的追加式结果集合，任意工作线程都可以写入。
//! 所有工作线程结束后，一次性生成 `BatchSummary`。
//!
//! ## 依赖关系
//! - 被 `batch/scheduler.rs` 使用
//! - 使用 `parking_lot::Mutex` 保护内部列表

use crate::models::{BatchSummary, ErrorRecord, ProcessingMethod, ProcessingResult};

use parking_lot::Mutex;
use std::time::Duration;

/// 结果汇总器
#[derive(Default)]
pub struct ResultAggregator {
    /// (输入序号, 结果)
    entries: Mutex<Vec<(usize, ProcessingResult)>>,
}

/// 汇总时的批处理参数
pub struct SummaryContext {
    pub threads_used: usize,
    pub throttle_limit: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl ResultAggregator {
    pub fn with_capacity(capacity: usize) -> Self {
        ResultAggregator {
            entries: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// 追加一条结果
    pub fn record(&self, index: usize, result: ProcessingResult) {
        self.entries.lock().push((index, result));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// 生成汇总（结果按输入序号排序）
    pub fn into_summary(self, ctx: SummaryContext) -> BatchSummary {
        let mut entries = self.entries.into_inner();
        entries.sort_by_key(|(index, _)| *index);
        debug_assert!(
            entries.windows(2).all(|w| w[0].0 != w[1].0),
            "duplicate result for the same work item"
        );

        let results: Vec<ProcessingResult> = entries.into_iter().map(|(_, r)| r).collect();

        let success_count = results.iter().filter(|r| r.success).count();
        let error_count = results.len() - success_count;
        let errors = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| ErrorRecord {
                file_name: r.file_name.clone(),
                error_message: r.error_message.clone().unwrap_or_default(),
                timestamp: r.timestamp,
            })
            .collect();

        BatchSummary {
            total_processed: success_count + error_count,
            success_count,
            error_count,
            errors,
            threads_used: ctx.threads_used,
            throttle_limit_used: ctx.throttle_limit,
            processing_method: ProcessingMethod::Parallel,
            total_elapsed: ctx.elapsed,
            cancelled: ctx.cancelled,
            results,
        }
    }
}
