//! # 工作项与处理结果数据模型
//!
//! 每个待处理文件对应一个 `WorkItem`，由处理器产出一个
//! `ProcessingOutcome`，调度器再将其封装为带有工作线程编号和
//! 时间戳的 `ProcessingResult`。
//!
//! ## 依赖关系
//! - 被 `batch/`、`engine/` 和 `commands/` 使用
//! - 无外部模块依赖

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 单个待处理文件（源路径 / 目标路径）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// 源文件路径
    pub source: PathBuf,
    /// 输出文件路径
    pub destination: PathBuf,
}

impl WorkItem {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        WorkItem {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// 源文件名（用于结果记录和进度显示）
    pub fn file_name(&self) -> String {
        display_name(&self.source)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 处理器对单个文件的返回值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingOutcome {
    pub success: bool,
    /// 原始大小（字节）
    pub original_size: u64,
    /// 处理后大小（字节）
    pub optimized_size: u64,
    pub error_message: Option<String>,
}

impl ProcessingOutcome {
    /// 处理成功
    pub fn success(original_size: u64, optimized_size: u64) -> Self {
        ProcessingOutcome {
            success: true,
            original_size,
            optimized_size,
            error_message: None,
        }
    }

    /// 处理失败
    pub fn failure(message: impl Into<String>) -> Self {
        ProcessingOutcome {
            success: false,
            original_size: 0,
            optimized_size: 0,
            error_message: Some(message.into()),
        }
    }
}

/// 单个文件的最终处理记录
///
/// 每个 `WorkItem` 恰好产生一条，由处理它的工作线程创建，
/// 写入结果汇总器后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub file_name: String,
    pub success: bool,
    pub original_size: u64,
    pub optimized_size: u64,
    /// 体积缩减百分比（保留两位小数）
    pub compression_ratio: f64,
    pub error_message: Option<String>,
    /// 处理该文件的工作线程编号
    pub worker_id: usize,
    pub timestamp: DateTime<Utc>,
}

impl ProcessingResult {
    /// 由处理器返回值构造结果记录
    pub fn from_outcome(item: &WorkItem, outcome: ProcessingOutcome, worker_id: usize) -> Self {
        let compression_ratio = if outcome.success {
            compression_ratio(outcome.original_size, outcome.optimized_size)
        } else {
            0.0
        };

        ProcessingResult {
            file_name: item.file_name(),
            success: outcome.success,
            original_size: outcome.original_size,
            optimized_size: outcome.optimized_size,
            compression_ratio,
            error_message: if outcome.success {
                None
            } else {
                Some(
                    outcome
                        .error_message
                        .unwrap_or_else(|| "processing failed".to_string()),
                )
            },
            worker_id,
            timestamp: Utc::now(),
        }
    }

    /// 构造失败记录（处理器返回错误、panic 或批处理被取消）
    pub fn failed(item: &WorkItem, message: impl Into<String>, worker_id: usize) -> Self {
        ProcessingResult {
            file_name: item.file_name(),
            success: false,
            original_size: 0,
            optimized_size: 0,
            compression_ratio: 0.0,
            error_message: Some(message.into()),
            worker_id,
            timestamp: Utc::now(),
        }
    }

    /// 节省的字节数（输出变大时为负）
    pub fn bytes_saved(&self) -> i64 {
        self.original_size as i64 - self.optimized_size as i64
    }
}

/// 体积缩减百分比: (1 - optimized / original) * 100，保留两位小数
pub fn compression_ratio(original: u64, optimized: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let ratio = (1.0 - optimized as f64 / original as f64) * 100.0;
    (ratio * 100.0).round() / 100.0
}
