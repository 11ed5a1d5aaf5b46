//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `engine/`, `models/`, `utils/`
//! - 子模块: optimize, check

pub mod check;
pub mod optimize;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Optimize(args) => optimize::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
