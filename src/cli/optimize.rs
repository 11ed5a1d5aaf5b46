//! # optimize 子命令 CLI 定义
//!
//! 并行批量处理图片 (输入目录 -> 输出目录)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/optimize.rs`

use crate::batch::collector::DEFAULT_IMAGE_PATTERN;

use clap::Args;
use std::path::PathBuf;

/// 默认外部优化命令
pub const DEFAULT_COMMAND: &str = "magick {input} -strip -quality 85 {output}";

/// optimize 子命令参数
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Input image file or directory
    pub input: PathBuf,

    /// Output directory for optimized files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Glob patterns for input files (comma-separated)
    #[arg(short, long, default_value = DEFAULT_IMAGE_PATTERN)]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Maximum number of images processed concurrently (0 = auto)
    #[arg(short, long, env = "PIXBATCH_JOBS", default_value_t = 0)]
    pub jobs: usize,

    /// Engine command template with {input} and {output} placeholders
    #[arg(short, long, env = "PIXBATCH_COMMAND", default_value = DEFAULT_COMMAND)]
    pub command: String,

    /// Replace the extension of output files (e.g. 'webp')
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Retry a failed image this many extra times
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Stop dispatching new images after this many failures
    #[arg(long)]
    pub max_failures: Option<usize>,

    /// Refresh the progress message every N percent (0 = every image)
    #[arg(long, default_value_t = 5.0)]
    pub progress_step: f64,

    /// Do not draw a progress bar (for logs and CI)
    #[arg(long, env = "PIXBATCH_NO_PROGRESS", default_value_t = false)]
    pub no_progress: bool,
}
