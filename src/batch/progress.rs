//! # 进度跟踪器
//!
//! 维护已完成文件计数并在每个文件完成时生成 `ProgressSnapshot`。
//!
//! ## 功能
//! - 原子递增计数器：每次完成得到唯一且单调的 `files_processed`
//! - 基于该计数值构造快照（百分比、耗时、速率、剩余时间）
//! - 在隔离边界内调用可选的进度回调
//!
//! 快照的发出顺序在多个线程之间可能交错，但按 `files_processed`
//! 排序后百分比严格递增，最后一个为 100.0。
//!
//! ## 依赖关系
//! - 被 `batch/scheduler.rs` 使用
//! - 使用 `batch/isolation.rs` 调用回调

use super::isolation;
use crate::models::ProgressSnapshot;

use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// 进度回调类型
pub type ProgressFn<'a> = dyn Fn(&ProgressSnapshot) -> anyhow::Result<()> + Sync + 'a;

/// 进度跟踪器
pub struct ProgressTracker<'a> {
    total_files: usize,
    files_processed: AtomicUsize,
    start_time: Instant,
    callback: Option<&'a ProgressFn<'a>>,
}

impl<'a> ProgressTracker<'a> {
    /// 创建跟踪器，开始计时
    pub fn new(total_files: usize, callback: Option<&'a ProgressFn<'a>>) -> Self {
        ProgressTracker {
            total_files,
            files_processed: AtomicUsize::new(0),
            start_time: Instant::now(),
            callback,
        }
    }

    /// 记录一个文件完成（成功或失败），返回对应快照
    pub fn record(&self, current_file: &str) -> ProgressSnapshot {
        let processed = self.files_processed.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = build_snapshot(
            processed,
            self.total_files,
            self.start_time.elapsed(),
            current_file,
        );

        if let Some(callback) = self.callback {
            isolation::run_callback(callback, &snapshot);
        }

        snapshot
    }

    #[cfg(test)]
    pub fn files_processed(&self) -> usize {
        self.files_processed.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// 由计数值和耗时构造快照
pub fn build_snapshot(
    processed: usize,
    total: usize,
    elapsed: Duration,
    current_file: &str,
) -> ProgressSnapshot {
    let percent_complete = if total == 0 {
        100.0
    } else {
        round2(processed as f64 / total as f64 * 100.0)
    };

    let elapsed_secs = elapsed.as_secs_f64();
    let processing_rate = if elapsed_secs <= f64::EPSILON {
        0.0
    } else {
        processed as f64 / elapsed_secs
    };

    let remaining_files = total.saturating_sub(processed);
    let estimated_remaining = if processed == 0 {
        Duration::ZERO
    } else {
        let secs = elapsed_secs / processed as f64 * remaining_files as f64;
        Duration::from_secs_f64(secs.max(0.0))
    };

    ProgressSnapshot {
        percent_complete,
        files_processed: processed,
        total_files: total,
        current_file: current_file.to_string(),
        elapsed,
        estimated_remaining,
        processing_rate,
        timestamp: Utc::now(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_snapshot_metrics() {
        let snap = build_snapshot(2, 8, Duration::from_secs(4), "x.png");

        assert_eq!(snap.percent_complete, 25.0);
        assert_eq!(snap.files_processed, 2);
        assert_eq!(snap.total_files, 8);
        assert_eq!(snap.current_file, "x.png");
        assert!((snap.processing_rate - 0.5).abs() < 1e-9);
        // 2 秒/文件 * 剩余 6 个
        assert_eq!(snap.estimated_remaining, Duration::from_secs(12));
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        let snap = build_snapshot(1, 3, Duration::from_millis(10), "a");
        assert_eq!(snap.percent_complete, 33.33);

        let snap = build_snapshot(2, 3, Duration::from_millis(10), "b");
        assert_eq!(snap.percent_complete, 66.67);

        let snap = build_snapshot(3, 3, Duration::from_millis(10), "c");
        assert_eq!(snap.percent_complete, 100.0);
        assert_eq!(snap.estimated_remaining, Duration::ZERO);
    }

    #[test]
    fn test_zero_elapsed_gives_zero_rate() {
        let snap = build_snapshot(1, 2, Duration::ZERO, "a");
        assert_eq!(snap.processing_rate, 0.0);
        assert_eq!(snap.estimated_remaining, Duration::ZERO);
    }

    #[test]
    fn test_tracker_counts_and_invokes_callback() {
        let seen = Mutex::new(Vec::new());
        let callback = |s: &ProgressSnapshot| -> anyhow::Result<()> {
            seen.lock().push(s.files_processed);
            Ok(())
        };
        let tracker = ProgressTracker::new(3, Some(&callback as &ProgressFn<'_>));

        tracker.record("a");
        tracker.record("b");
        let last = tracker.record("c");

        assert_eq!(tracker.files_processed(), 3);
        assert_eq!(last.percent_complete, 100.0);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_failing_callback_does_not_stop_counting() {
        let callback = |_: &ProgressSnapshot| -> anyhow::Result<()> {
            anyhow::bail!("terminal gone")
        };
        let tracker = ProgressTracker::new(2, Some(&callback as &ProgressFn<'_>));

        tracker.record("a");
        let last = tracker.record("b");

        assert_eq!(tracker.files_processed(), 2);
        assert_eq!(last.percent_complete, 100.0);
    }

    #[test]
    fn test_concurrent_records_never_lose_increments() {
        let total = 400;
        let tracker = ProgressTracker::new(total, None);
        let counts = Mutex::new(Vec::with_capacity(total));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..total / 8 {
                        let snap = tracker.record("f");
                        counts.lock().push(snap.files_processed);
                    }
                });
            }
        });

        let mut counts = counts.into_inner();
        counts.sort_unstable();
        assert_eq!(counts, (1..=total).collect::<Vec<_>>());
        assert_eq!(tracker.files_processed(), total);
    }
}
