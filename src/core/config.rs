//! # Embedded Configuration Module / 内嵌配置模块
//!
//! Test cases are described inside the simulation input file itself, on lines
//! that start with a two-character marker (`#@` by default):
//!
//! ```text
//! #@ [basic]
//! #@ dim    = 2
//! #@ nprocs = 1
//! #@ args   = max_step=10
//! #@          amr.plot_int=5
//! ```
//!
//! Extraction happens in two phases. [`extract_config_text`] filters the marked
//! lines into a plain text buffer, and [`parse_document`] reads that buffer as a
//! sectioned key/value document. Keys may repeat within a section; what happens
//! then is decided per key by a [`DuplicatePolicy`].
//!
//! 测试用例描述在仿真输入文件内部，位于以两个字符的标记（默认为 `#@`）开头的行上。
//! 提取分两个阶段进行：[`extract_config_text`] 将带标记的行过滤为纯文本缓冲区，
//! [`parse_document`] 将该缓冲区解析为分节的键值文档。同一节中的键可以重复，
//! 重复时的处理方式由每个键的 [`DuplicatePolicy`] 决定。

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Default prefix that marks a configuration line inside an input file.
pub const DEFAULT_MARKER: &str = "#@";

/// Errors raised while reading or validating test configuration.
///
/// These are fatal for the enclosing test directory but never for the suite.
///
/// 读取或校验测试配置时产生的错误。
/// 这些错误对所在的测试目录是致命的，但不会中断整个套件。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("line {line}: key outside of any section: '{content}'")]
    MissingSectionHeader { line: usize, content: String },
    #[error("line {line}: malformed section header: '{content}'")]
    MalformedSectionHeader { line: usize, content: String },
    #[error("line {line}: expected 'key = value', found '{content}'")]
    MalformedLine { line: usize, content: String },
    #[error("[{section}] key '{key}' may only be given once")]
    DuplicateKey { section: String, key: String },
    #[error("[{section}] if 'cmd' is specified no other parameters can be set; received {keys}")]
    CommandWithOtherKeys { section: String, keys: String },
    #[error("[{section}] invalid value for {key}: '{value}'")]
    InvalidBoolean {
        section: String,
        key: String,
        value: String,
    },
    #[error("[{section}] invalid integer for {key}: '{value}'")]
    InvalidInteger {
        section: String,
        key: String,
        value: String,
    },
    #[error("[{section}] invalid number for {key}: '{value}'")]
    InvalidNumber {
        section: String,
        key: String,
        value: String,
    },
    #[error("[{section}] cannot parse command '{command}': {reason}")]
    MalformedCommand {
        section: String,
        command: String,
        reason: String,
    },
    #[error("cannot specify both --{first} and --{second}")]
    ConflictingOptions {
        first: &'static str,
        second: &'static str,
    },
}

/// What to do when a key appears more than once in the same section.
/// 同一节中某个键出现多次时的处理策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep every value, in order, joined by newlines.
    Append,
    /// The last value wins.
    Overwrite,
    /// A repeated key is a configuration error.
    Reject,
}

/// The policy used for the recognized test keys.
///
/// `args` and `ignore` are naturally multi-valued, `cmd` must be unambiguous,
/// and every other key keeps its last value.
pub fn duplicate_policy(key: &str) -> DuplicatePolicy {
    match key {
        "args" | "ignore" => DuplicatePolicy::Append,
        "cmd" => DuplicatePolicy::Reject,
        _ => DuplicatePolicy::Overwrite,
    }
}

/// Result of canonicalizing a boolean-like string.
/// 规范化类布尔字符串的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolLike {
    True,
    False,
    Invalid,
}

/// Maps `yes`/`true`/`1` and `no`/`false`/`0` (any letter case) onto [`BoolLike`].
pub fn canonicalize_bool(value: &str) -> BoolLike {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => BoolLike::True,
        "no" | "false" | "0" => BoolLike::False,
        _ => BoolLike::Invalid,
    }
}

/// One named section of the configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    entries: IndexMap<String, String>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, value: String, policy: DuplicatePolicy) -> Result<(), ConfigError> {
        match self.entries.get_mut(&key) {
            None => {
                self.entries.insert(key, value);
            }
            Some(existing) => match policy {
                DuplicatePolicy::Append => {
                    existing.push('\n');
                    existing.push_str(&value);
                }
                DuplicatePolicy::Overwrite => *existing = value,
                DuplicatePolicy::Reject => {
                    return Err(ConfigError::DuplicateKey {
                        section: self.name.clone(),
                        key,
                    });
                }
            },
        }
        Ok(())
    }
}

/// An ordered collection of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Keeps only sections whose name appears in `names`, preserving file order.
    /// 仅保留名称出现在 `names` 中的节，并保持文件中的顺序。
    pub fn retain_named(&mut self, names: &[String]) {
        self.sections.retain(|s| names.iter().any(|n| n == &s.name));
    }
}

/// Collects every line that starts with `marker`, with the marker removed.
/// All other lines are dropped.
///
/// 收集所有以 `marker` 开头的行（去除标记本身），其余行全部丢弃。
pub fn extract_config_text(source: &str, marker: &str) -> String {
    let mut buffer = String::new();
    for line in source.lines() {
        if let Some(rest) = line.strip_prefix(marker) {
            buffer.push_str(rest);
            buffer.push('\n');
        }
    }
    buffer
}

/// Parses a configuration buffer using the default per-key [`duplicate_policy`].
pub fn parse_document(text: &str) -> Result<ConfigDocument, ConfigError> {
    parse_document_with(text, duplicate_policy)
}

/// Parses a sectioned key/value document.
///
/// Grammar:
/// - `[name]` opens a section; a repeated header continues the earlier section.
/// - `key = value` or `key: value` adds an entry; keys are trimmed and lower-cased.
/// - A line indented deeper than the previous key continues its value, joined
///   with a newline.
/// - Blank lines and lines starting with `#` or `;` are skipped.
///
/// 解析分节的键值文档。
/// - `[name]` 开启一个节；重复的节头会延续先前的节。
/// - `key = value` 或 `key: value` 添加一个条目；键会被去除空白并转为小写。
/// - 缩进比上一个键更深的行是该值的续行，以换行符连接。
/// - 空行以及以 `#` 或 `;` 开头的行会被跳过。
pub fn parse_document_with<F>(text: &str, policy: F) -> Result<ConfigDocument, ConfigError>
where
    F: Fn(&str) -> DuplicatePolicy,
{
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<usize> = None;
    // Section index, key and indentation of the entry a deeper-indented line continues.
    let mut continuing: Option<(usize, String, usize)> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            continuing = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indent = raw.len() - raw.trim_start().len();
        if let Some((section_idx, key, key_indent)) = &continuing {
            if indent > *key_indent {
                if let Some(value) = sections[*section_idx].entries.get_mut(key) {
                    value.push('\n');
                    value.push_str(trimmed);
                }
                continue;
            }
        }

        if trimmed.starts_with('[') {
            let name = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| ConfigError::MalformedSectionHeader {
                    line: line_no,
                    content: trimmed.to_string(),
                })?;
            let idx = match sections.iter().position(|s| s.name == name) {
                Some(idx) => idx,
                None => {
                    sections.push(Section::new(name));
                    sections.len() - 1
                }
            };
            current = Some(idx);
            continuing = None;
            continue;
        }

        let (key, value) = split_entry(trimmed).ok_or_else(|| ConfigError::MalformedLine {
            line: line_no,
            content: trimmed.to_string(),
        })?;
        let section_idx = current.ok_or_else(|| ConfigError::MissingSectionHeader {
            line: line_no,
            content: trimmed.to_string(),
        })?;

        let key = key.to_ascii_lowercase();
        sections[section_idx].insert(key.clone(), value.to_string(), policy(&key))?;
        continuing = Some((section_idx, key, indent));
    }

    Ok(ConfigDocument { sections })
}

/// Splits `key = value` / `key: value` at the first delimiter.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}

/// Reads `test_dir/input_file` and parses its embedded configuration.
///
/// # Arguments
/// * `test_dir` - The test directory
/// * `input_file` - Name of the input file inside `test_dir`
/// * `marker` - Line prefix that marks configuration lines
///
/// # Errors
/// Fails when the file cannot be read or the embedded document is malformed.
pub fn read_test_config(test_dir: &Path, input_file: &str, marker: &str) -> Result<ConfigDocument> {
    let input_path = test_dir.join(input_file);
    let source = fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;
    let text = extract_config_text(&source, marker);
    let document = parse_document(&text)
        .with_context(|| format!("Invalid test configuration in {}", input_path.display()))?;
    Ok(document)
}
