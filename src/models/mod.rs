//! # 数据模型模块
//!
//! 定义工作项、处理结果、进度快照与批处理汇总。
//!
//! ## 依赖关系
//! - 被 `batch/`、`engine/` 和 `commands/` 使用
//! - 子模块: work, report

pub mod report;
pub mod work;

pub use report::{BatchSummary, ErrorRecord, ProcessingMethod, ProgressSnapshot};
pub use work::{ProcessingOutcome, ProcessingResult, WorkItem};
