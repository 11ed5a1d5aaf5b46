//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `optimize`: 并行批量处理图片
//! - `check`: 检查外部优化程序是否可用
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: optimize, check

pub mod check;
pub mod optimize;

use clap::{Parser, Subcommand};

/// Pixbatch - 并行批量图片优化工具
#[derive(Parser)]
#[command(name = "pixbatch")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Parallel batch image optimization driver", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Optimize a batch of images in parallel with an external engine
    Optimize(optimize::OptimizeArgs),

    /// Check that the external optimization engine is installed
    Check(check::CheckArgs),
}
