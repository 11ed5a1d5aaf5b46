//! # optimize 命令实现
//!
//! 并行批量优化图片。
//!
//! ## 功能
//! - 收集输入图片并规划输出路径
//! - 跳过已存在的输出（除非 `--overwrite`）
//! - 检测外部优化程序
//! - 有界并行处理，实时进度条（`--no-progress` 时关闭）
//! - 打印汇总与失败列表
//!
//! ## 依赖关系
//! - 使用 `cli/optimize.rs` 定义的参数
//! - 使用 `batch/` 调度，`engine/` 处理单个文件
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::{isolation, plan_work_items, BatchScheduler, CancellationToken, FileCollector};
use crate::cli::optimize::OptimizeArgs;
use crate::engine::CommandEngine;
use crate::error::{PixbatchError, Result};
use crate::models::{BatchSummary, ProgressSnapshot, WorkItem};
use crate::utils::output;
use crate::utils::progress::ProgressDisplay;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tabled::{Table, Tabled};

/// 最多显示的失败条目数
const MAX_LISTED_FAILURES: usize = 10;

/// 失败列表行
#[derive(Debug, Clone, Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// 执行 optimize 命令
pub fn execute(args: OptimizeArgs) -> Result<()> {
    output::print_header("Optimizing Images");

    if !args.input.exists() {
        return Err(PixbatchError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    // 检测外部程序
    let engine = CommandEngine::parse(&args.command)?;
    let engine_path = engine.ensure_available()?;
    output::print_info(&format!(
        "Using engine '{}' ({})",
        engine.program(),
        engine_path.display()
    ));

    // 收集文件
    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    let planned = plan_work_items(&files, &args.input, &args.output, args.extension.as_deref());
    let (items, skipped) = partition_existing(planned, args.overwrite);

    output::print_info(&format!(
        "Found {} images ({} to process, {} already optimized)",
        files.len(),
        items.len(),
        skipped
    ));

    if items.is_empty() {
        output::print_done("Nothing to do. Use --overwrite to process again.");
        return Ok(());
    }

    fs::create_dir_all(&args.output).map_err(|e| PixbatchError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    // 设置并行度
    let jobs = if args.jobs == 0 {
        num_cpus::get()
    } else {
        args.jobs
    };

    let token = CancellationToken::new();
    let scheduler = BatchScheduler::new(jobs)?
        .with_retries(args.retries)
        .with_cancellation(token.clone());

    let failures = AtomicUsize::new(0);
    let processor = |item: &WorkItem| {
        let outcome = engine.process(item);
        let failed = !matches!(&outcome, Ok(o) if o.success);
        if failed {
            let count = failures.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(limit) = args.max_failures {
                if count >= limit && !token.is_cancelled() {
                    token.cancel();
                }
            }
        }
        outcome
    };

    let summary = if args.no_progress {
        scheduler.run(&items, processor)?
    } else {
        let display = ProgressDisplay::new(items.len(), args.progress_step);
        let summary = isolation::with_quiet_panics(|| {
            scheduler.run_with_progress(&items, processor, |snapshot: &ProgressSnapshot| {
                display.update(snapshot);
                Ok(())
            })
        })?;
        display.finish();
        summary
    };

    print_summary(&summary, skipped, args.max_failures);
    Ok(())
}

/// 拆分出输出已存在的工作项，返回 (待处理, 跳过数量)
fn partition_existing(items: Vec<WorkItem>, overwrite: bool) -> (Vec<WorkItem>, usize) {
    if overwrite {
        return (items, 0);
    }
    let total = items.len();
    let pending: Vec<WorkItem> = items
        .into_iter()
        .filter(|item| !item.destination.exists())
        .collect();
    let skipped = total - pending.len();
    (pending, skipped)
}

/// 打印批处理汇总
fn print_summary(summary: &BatchSummary, skipped: usize, max_failures: Option<usize>) {
    output::print_batch_summary(summary, skipped);

    if summary.cancelled {
        if let Some(limit) = max_failures {
            output::print_warning(&format!(
                "Stopped dispatching after {} failures; remaining images were not processed",
                limit
            ));
        }
    }

    if summary.errors.is_empty() {
        return;
    }

    output::print_warning("Failed files:");
    let rows: Vec<FailureRow> = summary
        .errors
        .iter()
        .take(MAX_LISTED_FAILURES)
        .map(|e| FailureRow {
            file: e.file_name.clone(),
            error: e.error_message.clone(),
        })
        .collect();
    println!("{}", Table::new(&rows));

    if summary.errors.len() > MAX_LISTED_FAILURES {
        output::print_warning(&format!(
            "  ... and {} more",
            summary.errors.len() - MAX_LISTED_FAILURES
        ));
    }
}
