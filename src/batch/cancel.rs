//! # 取消令牌
//!
//! 可克隆的取消标志。工作线程在领取下一个文件前检查它；
//! 已经开始的文件会正常完成，尚未派发的文件记为失败。
//!
//! ## 依赖关系
//! - 被 `batch/scheduler.rs` 使用
//! - 被 `commands/optimize.rs` 用于 `--max-failures`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消（可重复调用）
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
