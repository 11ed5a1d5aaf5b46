//! # 外部处理器模块
//!
//! 图像的实际转码由外部程序完成，这里只负责调用和依赖检测。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 子模块: command

pub mod command;

pub use command::CommandEngine;
