//! # 批量处理模块
//!
//! 并行批处理核心：在有界并发下把每个文件交给外部处理器，
//! 实时报告进度，汇总每个文件的结果，并隔离单个文件或进度回调的失败。
//!
//! ## 功能
//! - 收集匹配文件并规划输出路径
//! - 有界并行调度（rayon 线程池）
//! - 进度跟踪与回调
//! - 线程安全的结果汇总
//! - 失败隔离、重试与取消
//!
//! ## 依赖关系
//! - 被 `commands/optimize.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `models/` 中的数据类型

pub mod aggregator;
pub mod cancel;
pub mod collector;
pub mod isolation;
pub mod progress;
pub mod scheduler;

pub use cancel::CancellationToken;
pub use collector::{plan_work_items, FileCollector};
pub use scheduler::BatchScheduler;
