//! # 错误隔离边界
//!
//! 两处隔离：
//! - 处理器调用：返回 `Err` 或 panic 都转换为失败的 `ProcessingOutcome`
//! - 进度回调调用：返回 `Err` 或 panic 都只记录日志后丢弃
//!
//! 任何单个文件或回调的失败都不会传播到工作线程之外。
//! 依赖 `catch_unwind`，因此 release 配置不能使用 `panic = "abort"`。
//!
//! 被捕获的 panic 仍会经过全局 panic hook 打印到 stderr，
//! 进度条显示期间用 `with_quiet_panics` 把它改为 debug 日志。
//!
//! ## 依赖关系
//! - 被 `batch/scheduler.rs` 和 `batch/progress.rs` 使用

use super::progress::ProgressFn;
use crate::models::{ProcessingOutcome, ProgressSnapshot, WorkItem};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// 在隔离边界内调用处理器
pub fn run_processor<P>(processor: &P, item: &WorkItem) -> ProcessingOutcome
where
    P: Fn(&WorkItem) -> anyhow::Result<ProcessingOutcome> + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| processor(item))) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            let message = format!("{:#}", e);
            warn!(file = %item.source.display(), error = %message, "processor returned an error");
            ProcessingOutcome::failure(message)
        }
        Err(payload) => {
            let message = format!("processor panicked: {}", panic_message(payload.as_ref()));
            warn!(file = %item.source.display(), error = %message, "processor panicked");
            ProcessingOutcome::failure(message)
        }
    }
}

/// 在隔离边界内调用进度回调，返回回调是否正常结束
pub fn run_callback(callback: &ProgressFn<'_>, snapshot: &ProgressSnapshot) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            let message = format!("{:#}", e);
            warn!(
                files_processed = snapshot.files_processed,
                error = %message,
                "progress callback failed, ignoring"
            );
            false
        }
        Err(payload) => {
            warn!(
                files_processed = snapshot.files_processed,
                error = %panic_message(payload.as_ref()),
                "progress callback panicked, ignoring"
            );
            false
        }
    }
}

/// 在 `f` 执行期间把 panic hook 换成 debug 日志，结束后恢复原 hook
///
/// hook 是进程全局的，只应在主线程包裹整个批处理时使用。
pub fn with_quiet_panics<R>(f: impl FnOnce() -> R) -> R {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        debug!(panic = %info, "panic caught at isolation boundary");
    }));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    match result {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// 提取 panic 载荷中的消息
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};
    use chrono::Utc;
    use std::time::Duration;

    // 替换全局 panic hook 的测试互斥执行
    static HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn item() -> WorkItem {
        WorkItem::new("in/photo.jpg", "out/photo.jpg")
    }

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            percent_complete: 50.0,
            files_processed: 1,
            total_files: 2,
            current_file: "photo.jpg".to_string(),
            elapsed: Duration::from_secs(1),
            estimated_remaining: Duration::from_secs(1),
            processing_rate: 1.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_processor_success_passes_through() {
        let processor = |_: &WorkItem| -> anyhow::Result<ProcessingOutcome> {
            Ok(ProcessingOutcome::success(10, 5))
        };
        let outcome = run_processor(&processor, &item());
        assert_eq!(outcome, ProcessingOutcome::success(10, 5));
    }

    #[test]
    fn test_processor_error_becomes_failure() {
        let processor = |_: &WorkItem| -> anyhow::Result<ProcessingOutcome> {
            Err(anyhow!("corrupt header")).context("decode failed")
        };
        let outcome = run_processor(&processor, &item());
        assert!(!outcome.success);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("decode failed: corrupt header")
        );
    }

    #[test]
    fn test_processor_panic_becomes_failure() {
        let processor = |_: &WorkItem| -> anyhow::Result<ProcessingOutcome> {
            panic!("engine crashed");
        };
        let outcome = run_processor(&processor, &item());
        assert!(!outcome.success);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("processor panicked: engine crashed")
        );
    }

    #[test]
    fn test_callback_failures_are_swallowed() {
        let ok = |_: &ProgressSnapshot| -> anyhow::Result<()> { Ok(()) };
        let failing = |_: &ProgressSnapshot| -> anyhow::Result<()> { Err(anyhow!("display closed")) };
        let panicking = |_: &ProgressSnapshot| -> anyhow::Result<()> { panic!("render bug") };

        assert!(run_callback(&ok, &snapshot()));
        assert!(!run_callback(&failing, &snapshot()));
        assert!(!run_callback(&panicking, &snapshot()));
    }

    #[test]
    fn test_quiet_panics_still_isolates_and_returns() {
        let _guard = HOOK_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let processor = |_: &WorkItem| -> anyhow::Result<ProcessingOutcome> {
            panic!("decoder crashed");
        };
        let outcome = with_quiet_panics(|| run_processor(&processor, &item()));
        assert!(!outcome.success);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("processor panicked: decoder crashed")
        );
    }

    #[test]
    fn test_quiet_panics_propagates_uncaught_panic() {
        let _guard = HOOK_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let result = panic::catch_unwind(|| {
            with_quiet_panics(|| -> u32 { panic!("outside any boundary") })
        });
        let payload = result.unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "outside any boundary");

        // hook 已恢复，之后的隔离照常工作
        let processor = |_: &WorkItem| -> anyhow::Result<ProcessingOutcome> {
            Ok(ProcessingOutcome::success(1, 1))
        };
        assert!(run_processor(&processor, &item()).success);
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(42_u32);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "static");
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
