//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations:
//! test directory discovery, path resolution and capture file output.
//!
//! 此模块提供文件系统操作的实用功能：
//! 测试目录发现、路径解析以及捕获输出的文件写入。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists every entry directly under `root`, sorted by path.
/// Non-directory entries are kept so the caller can report them as ignored.
///
/// 列出 `root` 下的所有直接条目，按路径排序。
/// 非目录条目也会保留，以便调用方将其报告为已忽略。
pub fn list_entries_sorted(root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(root)
        .with_context(|| format!("Failed to list test root: {}", root.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read entry under: {}", root.display()))?;
    entries.sort();
    Ok(entries)
}

/// Writes one captured stream into `dir/name`, creating `dir` if needed.
///
/// # Arguments
/// * `dir` - The case output directory
/// * `name` - File name, `stdout` or `stderr`
/// * `contents` - Text to write
pub fn write_capture(dir: &Path, name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Resolves `path` against the current directory, following symlinks.
/// The path has to exist.
///
/// 将 `path` 相对于当前目录解析为绝对路径（会解析符号链接），该路径必须存在。
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Cannot resolve {}", path.display()))
}
