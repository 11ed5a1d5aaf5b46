//! # 终端输出
//!
//! 统一的状态前缀 (`[OK]`/`[WARN]`/...) 和批处理汇总的打印。
//! 状态行写到 stdout，错误写到 stderr。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和所有 `commands/` 模块使用
//! - 读取 `models/report.rs` 的 `BatchSummary`
//! - 使用 `colored` crate

use crate::models::BatchSummary;

use colored::Colorize;

const RULE_WIDTH: usize = 60;

pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 命令开始时的标题栏
pub fn print_header(title: &str) {
    let rule = "─".repeat(RULE_WIDTH);
    println!("\n{}", rule.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", rule.dimmed());
}

/// 打印批处理计数、线程和体积统计
///
/// 失败数为 0 时用绿色，否则用红色；体积行只在有成功文件时出现。
pub fn print_batch_summary(summary: &BatchSummary, skipped: usize) {
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());

    let failed = if summary.error_count == 0 {
        summary.error_count.to_string().green()
    } else {
        summary.error_count.to_string().red().bold()
    };
    let marker = if summary.error_count == 0 {
        "[OK]".green().bold()
    } else {
        "[WARN]".yellow().bold()
    };
    println!(
        "{} Batch complete: {} success, {} failed, {} skipped",
        marker,
        summary.success_count.to_string().green(),
        failed,
        skipped.to_string().dimmed()
    );

    print_info(&format!(
        "{} processing: {} threads (throttle limit {}), {:.2}s",
        summary.processing_method,
        summary.threads_used,
        summary.throttle_limit_used,
        summary.total_elapsed.as_secs_f64()
    ));

    let original = summary.total_original_size();
    if original > 0 {
        print_info(&format!(
            "Size: {} -> {} (saved {}, {:.2}%)",
            format_bytes(original as i64),
            format_bytes(summary.total_optimized_size() as i64),
            format_bytes(summary.bytes_saved()),
            summary.overall_compression_ratio()
        ));
    }
}

/// 以 B/KiB/MiB/GiB 显示字节数，保留符号
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let sign = if bytes < 0 { "-" } else { "" };
    let mut value = bytes.unsigned_abs() as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{} {}", sign, bytes.unsigned_abs(), UNITS[0])
    } else {
        format!("{}{:.1} {}", sign, value, UNITS[unit])
    }
}
