//! # check 命令实现
//!
//! 检测外部优化程序是否安装。
//!
//! ## 依赖关系
//! - 使用 `cli/check.rs` 定义的参数
//! - 使用 `engine/`

use crate::cli::check::CheckArgs;
use crate::engine::CommandEngine;
use crate::error::Result;
use crate::utils::output;

/// 执行 check 命令
pub fn execute(args: CheckArgs) -> Result<()> {
    output::print_header("Checking Optimization Engine");

    let engine = CommandEngine::parse(&args.command)?;
    let path = engine.ensure_available()?;

    output::print_success(&format!("Found '{}' at {}", engine.program(), path.display()));
    Ok(())
}
