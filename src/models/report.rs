//! # 进度快照与批处理汇总
//!
//! `ProgressSnapshot` 是进度跟踪器在某一时刻的只读视图，
//! `BatchSummary` 是整个批处理在所有工作线程结束后的唯一返回值。
//!
//! ## 依赖关系
//! - 被 `batch/progress.rs`、`batch/aggregator.rs` 创建
//! - 被 `commands/optimize.rs` 和 `utils/progress.rs` 读取

use super::work::ProcessingResult;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// 进度快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// 完成百分比 (0-100，两位小数)
    pub percent_complete: f64,
    pub files_processed: usize,
    pub total_files: usize,
    /// 刚完成的文件名
    pub current_file: String,
    pub elapsed: Duration,
    pub estimated_remaining: Duration,
    /// 处理速率（文件/秒）
    pub processing_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// 失败文件记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub file_name: String,
    pub error_message: String,
    pub timestamp: DateTime<Utc>,
}

/// 调度方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessingMethod {
    Parallel,
}

impl std::fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingMethod::Parallel => write!(f, "Parallel"),
        }
    }
}

/// 批处理汇总
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// 失败详情（按输入顺序）
    pub errors: Vec<ErrorRecord>,
    pub threads_used: usize,
    pub throttle_limit_used: usize,
    pub processing_method: ProcessingMethod,
    pub total_elapsed: Duration,
    /// 是否收到取消请求
    pub cancelled: bool,
    /// 全部结果记录（按输入顺序）
    pub results: Vec<ProcessingResult>,
}

impl BatchSummary {
    /// 空批处理的汇总
    pub fn empty(throttle_limit: usize) -> Self {
        BatchSummary {
            total_processed: 0,
            success_count: 0,
            error_count: 0,
            errors: Vec::new(),
            threads_used: 0,
            throttle_limit_used: throttle_limit,
            processing_method: ProcessingMethod::Parallel,
            total_elapsed: Duration::ZERO,
            cancelled: false,
            results: Vec::new(),
        }
    }

    /// 成功文件的原始总大小
    pub fn total_original_size(&self) -> u64 {
        self.results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.original_size)
            .sum()
    }

    /// 成功文件处理后的总大小
    pub fn total_optimized_size(&self) -> u64 {
        self.results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.optimized_size)
            .sum()
    }

    /// 整体体积缩减百分比
    pub fn overall_compression_ratio(&self) -> f64 {
        super::work::compression_ratio(self.total_original_size(), self.total_optimized_size())
    }

    /// 成功文件共节省的字节数（整体变大时为负）
    pub fn bytes_saved(&self) -> i64 {
        self.results
            .iter()
            .filter(|r| r.success)
            .map(ProcessingResult::bytes_saved)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessingOutcome, WorkItem};

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::empty(4);
        assert_eq!(summary.total_processed, 0);
        assert_eq!(summary.threads_used, 0);
        assert_eq!(summary.throttle_limit_used, 4);
        assert_eq!(summary.processing_method.to_string(), "Parallel");
        assert_eq!(summary.overall_compression_ratio(), 0.0);
    }

    #[test]
    fn test_size_totals_ignore_failures() {
        let mut summary = BatchSummary::empty(2);
        let ok = WorkItem::new("a.jpg", "out/a.jpg");
        let bad = WorkItem::new("b.jpg", "out/b.jpg");
        summary.results = vec![
            ProcessingResult::from_outcome(&ok, ProcessingOutcome::success(400, 100), 0),
            ProcessingResult::failed(&bad, "boom", 1),
        ];

        assert_eq!(summary.total_original_size(), 400);
        assert_eq!(summary.total_optimized_size(), 100);
        assert!((summary.overall_compression_ratio() - 75.0).abs() < 1e-9);
        assert_eq!(summary.bytes_saved(), 300);
    }

    #[test]
    fn test_bytes_saved_can_be_negative() {
        let mut summary = BatchSummary::empty(1);
        let shrunk = WorkItem::new("a.png", "out/a.png");
        let grown = WorkItem::new("b.png", "out/b.png");
        summary.results = vec![
            ProcessingResult::from_outcome(&shrunk, ProcessingOutcome::success(100, 90), 0),
            ProcessingResult::from_outcome(&grown, ProcessingOutcome::success(100, 150), 0),
        ];
        assert_eq!(summary.bytes_saved(), -40);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let mut summary = BatchSummary::empty(3);
        let item = WorkItem::new("in/cat.jpg", "out/cat.jpg");
        summary.results = vec![ProcessingResult::failed(&item, "Invalid format", 2)];
        summary.errors = vec![ErrorRecord {
            file_name: "cat.jpg".to_string(),
            error_message: "Invalid format".to_string(),
            timestamp: summary.results[0].timestamp,
        }];
        summary.total_processed = 1;
        summary.error_count = 1;

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["total_processed"], 1);
        assert_eq!(value["error_count"], 1);
        assert_eq!(value["throttle_limit_used"], 3);
        assert_eq!(value["processing_method"], "Parallel");
        assert_eq!(value["cancelled"], false);
        assert_eq!(value["errors"][0]["file_name"], "cat.jpg");
        assert_eq!(value["results"][0]["worker_id"], 2);
        assert_eq!(value["results"][0]["error_message"], "Invalid format");
        assert!(value["results"][0]["timestamp"].is_string());
    }
}
