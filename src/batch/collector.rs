//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理图片，并规划每个文件的输出路径。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式，不区分大小写）
//! - 递归目录搜索
//! - 按输入目录的相对路径映射到输出目录
//!
//! ## 依赖关系
//! - 被 `commands/optimize.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{PixbatchError, Result};
use crate::models::WorkItem;

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配的图片格式
pub const DEFAULT_IMAGE_PATTERN: &str = "*.jpg,*.jpeg,*.png,*.webp,*.tiff,*.tif,*.bmp,*.gif";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec!["*".to_string()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec!["*".to_string()];
        }
        self
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（已排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(PixbatchError::FileNotFound {
                path: self.input.display().to_string(),
            });
        }

        let patterns = self.compile_patterns()?;
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| matches_any(&patterns, entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }

    fn compile_patterns(&self) -> Result<Vec<Pattern>> {
        self.patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| PixbatchError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// 检查文件名是否匹配任一模式
fn matches_any(patterns: &[Pattern], path: &Path) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    patterns
        .iter()
        .any(|p| p.matches_with(filename, MATCH_OPTIONS))
}

/// 为每个源文件规划输出路径
///
/// 输出路径保持源文件相对于 `input_root` 的目录结构；
/// 单文件输入时直接放在 `output_dir` 下。`extension` 给出时替换扩展名。
pub fn plan_work_items(
    files: &[PathBuf],
    input_root: &Path,
    output_dir: &Path,
    extension: Option<&str>,
) -> Vec<WorkItem> {
    files
        .iter()
        .map(|source| {
            let relative = source
                .strip_prefix(input_root)
                .ok()
                .filter(|r| !r.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .or_else(|| source.file_name().map(PathBuf::from))
                .unwrap_or_else(|| source.clone());

            let mut destination = output_dir.join(relative);
            if let Some(ext) = extension {
                destination.set_extension(ext.trim_start_matches('.'));
            }

            WorkItem::new(source.clone(), destination)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_collect_default_image_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("B.PNG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested/c.webp"));

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern(DEFAULT_IMAGE_PATTERN)
            .collect()
            .unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["B.PNG", "a.jpg"]);
    }

    #[test]
    fn test_collect_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("nested/deeper/b.jpg"));

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.jpg")
            .recursive(true)
            .collect()
            .unwrap();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.gif");
        touch(&file);

        let files = FileCollector::new(file.clone())
            .with_pattern("*.png")
            .collect()
            .unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileCollector::new(dir.path().join("missing")).collect();
        assert!(matches!(result, Err(PixbatchError::FileNotFound { .. })));
    }

    #[test]
    fn test_collect_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("[*.jpg")
            .collect();
        assert!(matches!(result, Err(PixbatchError::InvalidPattern { .. })));
    }

    #[test]
    fn test_empty_pattern_falls_back_to_all() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.bin"));

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern(" , ")
            .collect()
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_plan_preserves_relative_layout() {
        let files = vec![
            PathBuf::from("/in/a.jpg"),
            PathBuf::from("/in/trip/b.png"),
        ];
        let items = plan_work_items(&files, Path::new("/in"), Path::new("/out"), Some(".webp"));

        assert_eq!(items[0].destination, PathBuf::from("/out/a.webp"));
        assert_eq!(items[1].destination, PathBuf::from("/out/trip/b.webp"));
        assert_eq!(items[1].source, PathBuf::from("/in/trip/b.png"));
    }

    #[test]
    fn test_plan_single_file_input() {
        let files = vec![PathBuf::from("/in/a.jpg")];
        let items = plan_work_items(&files, Path::new("/in/a.jpg"), Path::new("/out"), None);
        assert_eq!(items[0].destination, PathBuf::from("/out/a.jpg"));
    }
}
