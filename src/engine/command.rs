//! # 外部命令处理器
//!
//! 把单个工作项交给外部图像优化程序（cwebp、pngquant、magick 等）处理。
//! 命令模板中的 `{input}` 和 `{output}` 会被替换为源路径和输出路径。
//!
//! ## 依赖关系
//! - 被 `commands/optimize.rs` 作为调度器的处理器使用
//! - 被 `commands/check.rs` 用于依赖检测

use crate::error::{PixbatchError, Result};
use crate::models::{ProcessingOutcome, WorkItem};

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// 外部命令处理器
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// 解析命令模板，例如 `cwebp -q 80 {input} -o {output}`
    pub fn parse(template: &str) -> Result<Self> {
        let mut tokens = template.split_whitespace().map(str::to_string);
        let program = tokens.next().ok_or_else(|| {
            PixbatchError::InvalidArgument("Command template is empty".to_string())
        })?;
        let args: Vec<String> = tokens.collect();

        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !args.iter().any(|a| a.contains(placeholder)) {
                return Err(PixbatchError::InvalidArgument(format!(
                    "Command template must contain '{}': {}",
                    placeholder, template
                )));
            }
        }

        Ok(Self { program, args })
    }

    /// 程序名
    pub fn program(&self) -> &str {
        &self.program
    }

    /// 检查程序是否存在于 PATH
    pub fn ensure_available(&self) -> Result<PathBuf> {
        find_in_path(&self.program).ok_or_else(|| PixbatchError::CommandNotFound {
            command: self.program.clone(),
        })
    }

    /// 替换占位符后的参数列表
    pub fn render_args(&self, item: &WorkItem) -> Vec<String> {
        let input = item.source.display().to_string();
        let output = item.destination.display().to_string();
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    /// 处理单个文件
    ///
    /// 启动失败返回 `Err`；程序以非零状态退出返回失败的 `ProcessingOutcome`。
    pub fn process(&self, item: &WorkItem) -> anyhow::Result<ProcessingOutcome> {
        let original_size = fs::metadata(&item.source)
            .with_context(|| format!("cannot read {}", item.source.display()))?
            .len();

        if let Some(parent) = item.destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }

        let args = self.render_args(item);
        debug!(program = %self.program, ?args, "running engine");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("failed to start '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Ok(ProcessingOutcome::failure(message));
        }

        let optimized_size = fs::metadata(&item.destination)
            .with_context(|| {
                format!(
                    "'{}' reported success but produced no {}",
                    self.program,
                    item.destination.display()
                )
            })?
            .len();

        Ok(ProcessingOutcome::success(original_size, optimized_size))
    }
}

/// 在 PATH 中查找可执行程序
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{}.exe", program));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
