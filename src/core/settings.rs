//! # Settings File Module / 设置文件模块
//!
//! Optional project-level defaults loaded from a TOML file (`runtests.toml` by
//! default). Command-line flags override anything set here.
//!
//! ```toml
//! language = "en"
//! tests_root = "./tests"
//! binary_prefix = "./bin/alamo"
//! compiler = "g++"
//! timeout = 10000
//! launcher = "mpirun -np"
//! ```
//!
//! 从 TOML 文件（默认为 `runtests.toml`）加载的可选项目级默认设置。
//! 命令行参数会覆盖此处的任何设置。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::DEFAULT_MARKER;

/// File name looked up in the invocation directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "runtests.toml";

/// Project-level defaults for a suite run.
/// 套件运行的项目级默认设置。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteSettings {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    pub language: Option<String>,
    /// Directory whose entries are the test directories when none are named.
    pub tests_root: PathBuf,
    /// Path prefix of the simulation binaries, e.g. `./bin/alamo` for `./bin/alamo-2d-g++`.
    pub binary_prefix: String,
    /// Compiler tag appended to every binary name.
    pub compiler: String,
    /// Default per-case timeout in seconds.
    pub timeout: u64,
    /// Multi-process launcher; the process count is appended to it.
    pub launcher: String,
    /// Line prefix that marks embedded configuration.
    pub marker: String,
    /// Name of the input file inside each test directory.
    pub input_file: String,
    /// Name of the checker executable inside each test directory.
    pub checker: String,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            language: None,
            tests_root: PathBuf::from("./tests"),
            binary_prefix: "./bin/alamo".to_string(),
            compiler: "g++".to_string(),
            timeout: 10000,
            launcher: "mpirun -np".to_string(),
            marker: DEFAULT_MARKER.to_string(),
            input_file: "input".to_string(),
            checker: "test".to_string(),
        }
    }
}

impl SuiteSettings {
    /// Loads settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] when `path` is `None`.
    ///
    /// A missing default file yields the built-in defaults; a missing explicit
    /// file is an error.
    ///
    /// 从 `path` 加载设置；若 `path` 为 `None`，则从 [`DEFAULT_SETTINGS_FILE`] 加载。
    /// 默认文件不存在时使用内置默认值；显式指定的文件不存在则报错。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }
}
