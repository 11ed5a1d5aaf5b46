//! # check 子命令 CLI 定义
//!
//! 检查外部优化程序是否在 PATH 中
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/check.rs`

use super::optimize::DEFAULT_COMMAND;
use clap::Args;

/// check 子命令参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Engine command template; only the program name is checked
    #[arg(short, long, env = "PIXBATCH_COMMAND", default_value = DEFAULT_COMMAND)]
    pub command: String,
}
