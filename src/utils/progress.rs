//! # 进度条工具
//!
//! 封装 `indicatif` 提供统一的进度条样式，并把调度器的进度快照
//! 渲染到终端。
//!
//! 显示层的节流（每跨过 `step` 百分比才刷新消息行）只影响显示，
//! 不影响调度器内部的计数。
//!
//! ## 依赖关系
//! - 被 `commands/optimize.rs` 使用
//! - 使用 `indicatif` crate

use crate::models::ProgressSnapshot;

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

/// 创建标准进度条
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .expect("progress bar template is valid")
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// 百分比节流器
#[derive(Debug)]
pub struct PercentThrottle {
    step: f64,
    next: f64,
}

impl PercentThrottle {
    /// `step <= 0` 表示每次都刷新
    pub fn new(step: f64) -> Self {
        Self {
            step: step.max(0.0),
            next: 0.0,
        }
    }

    /// 百分比是否跨过下一个阈值；跨过时推进阈值
    pub fn should_render(&mut self, percent: f64) -> bool {
        if percent < self.next {
            return false;
        }
        if self.step > 0.0 {
            self.next = ((percent / self.step).floor() + 1.0) * self.step;
        }
        true
    }
}

/// 终端进度显示
pub struct ProgressDisplay {
    bar: ProgressBar,
    throttle: Mutex<PercentThrottle>,
}

impl ProgressDisplay {
    pub fn new(total: usize, step: f64) -> Self {
        Self::with_bar(create_progress_bar(total as u64, "Optimizing"), step)
    }

    pub fn with_bar(bar: ProgressBar, step: f64) -> Self {
        Self {
            bar,
            throttle: Mutex::new(PercentThrottle::new(step)),
        }
    }

    /// 用快照更新进度条（快照可能乱序到达）
    pub fn update(&self, snapshot: &ProgressSnapshot) {
        let mut throttle = self.throttle.lock();

        let position = snapshot.files_processed as u64;
        if position > self.bar.position() {
            self.bar.set_position(position);
        }

        if throttle.should_render(snapshot.percent_complete) {
            self.bar.set_message(format!(
                "{:.2}% | {:.1} files/s | ETA {}s | {}",
                snapshot.percent_complete,
                snapshot.processing_rate,
                snapshot.estimated_remaining.as_secs(),
                snapshot.current_file
            ));
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
