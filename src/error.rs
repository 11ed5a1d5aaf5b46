//! # 统一错误处理模块
//!
//! 定义 Pixbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! 单个文件的处理失败和进度回调的失败都不会出现在这里：
//! 它们在批处理内部被捕获并转换为结果记录。这里只保留
//! 调度前的参数错误和外围命令（发现文件、检查依赖）的错误。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Pixbatch 统一错误类型
#[derive(Error, Debug)]
pub enum PixbatchError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 调度参数错误（调用方违约，调度前立即失败）
    // ─────────────────────────────────────────────────────────────
    #[error("Throttle limit must be at least 1, got {0}")]
    InvalidThrottleLimit(usize),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PixbatchError>;
