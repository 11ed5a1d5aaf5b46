//! # Pixbatch - 并行批量图片优化工具
//!
//! 把一批图片交给外部优化程序处理，在有界并发下运行，
//! 实时显示进度，并汇总每个文件的结果。任何单个文件的失败
//! 或进度显示的失败都不会中断整个批处理。
//!
//! ## 子命令
//! - `optimize` - 并行批量优化图片
//! - `check`    - 检查外部优化程序是否可用
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (并行调度、进度跟踪、结果汇总)
//!   │     ├── engine/    (外部优化程序)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod engine;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // 诊断日志写到 stderr，由 PIXBATCH_LOG 控制级别
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PIXBATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
