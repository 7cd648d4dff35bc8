//! # Suite Planning Module / 套件计划模块
//!
//! Holds the options a suite runs with, validates them before any case starts
//! and decides which test directories make up the suite.
//!
//! 保存套件运行所用的选项，在任何用例开始前校验它们，并确定套件由哪些测试目录组成。

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::ConfigError;
use crate::core::settings::SuiteSettings;
use crate::infra::{fs, system};

/// Every switch that shapes how cases are resolved and run.
/// 决定用例如何解析和运行的所有开关。
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteOptions {
    /// Explicit test directories. Empty means "discover under `tests_root`".
    pub tests: Vec<PathBuf>,
    pub tests_root: PathBuf,
    /// Run without the multi-process launcher; cases with `nprocs > 1` are excluded.
    pub serial: bool,
    /// Only run cases of this dimension.
    pub dim: Option<u32>,
    /// Only run the named sections.
    pub sections: Option<Vec<String>>,
    pub debug: bool,
    pub profile: bool,
    /// Use coverage binaries unless a case opts out.
    pub coverage: bool,
    /// Run only cases that end up using a coverage binary.
    pub only_coverage: bool,
    /// Never use coverage binaries.
    pub no_coverage: bool,
    /// Environment tag selecting `benchmark-<tag>` reference times.
    pub benchmark_tag: String,
    pub dry_run: bool,
    /// Echo every command before running it.
    pub echo_commands: bool,
    pub compiler: String,
    pub binary_prefix: String,
    pub launcher: String,
    /// Timeout for cases that do not set their own.
    pub default_timeout: Duration,
    pub marker: String,
    pub input_file: String,
    pub checker: String,
}

impl SuiteOptions {
    /// Options seeded from a settings file, with every flag off.
    /// 以设置文件为基础、所有开关关闭的选项。
    pub fn from_settings(settings: &SuiteSettings) -> Self {
        Self {
            tests: Vec::new(),
            tests_root: settings.tests_root.clone(),
            serial: false,
            dim: None,
            sections: None,
            debug: false,
            profile: false,
            coverage: false,
            only_coverage: false,
            no_coverage: false,
            benchmark_tag: system::hostname(),
            dry_run: false,
            echo_commands: false,
            compiler: settings.compiler.clone(),
            binary_prefix: settings.binary_prefix.clone(),
            launcher: settings.launcher.clone(),
            default_timeout: Duration::from_secs(settings.timeout),
            marker: settings.marker.clone(),
            input_file: settings.input_file.clone(),
            checker: settings.checker.clone(),
        }
    }

    /// Rejects contradictory coverage switches before anything runs.
    /// 在任何内容运行之前拒绝相互矛盾的覆盖率开关。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coverage && self.no_coverage {
            return Err(ConfigError::ConflictingOptions {
                first: "coverage",
                second: "no-coverage",
            });
        }
        if self.only_coverage && self.no_coverage {
            return Err(ConfigError::ConflictingOptions {
                first: "only-coverage",
                second: "no-coverage",
            });
        }
        Ok(())
    }
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self::from_settings(&SuiteSettings::default())
    }
}

/// Lists the test directories for a suite, sorted by path.
///
/// Explicitly named directories are used as given; otherwise every entry under
/// `tests_root` is listed. Entries that turn out not to be test directories are
/// filtered later so they can be reported as ignored.
///
/// 列出套件的测试目录，并按路径排序。
/// 显式指定的目录按原样使用；否则列出 `tests_root` 下的所有条目。
/// 不是测试目录的条目稍后再过滤，以便将其报告为已忽略。
pub fn discover_test_dirs(options: &SuiteOptions) -> Result<Vec<PathBuf>> {
    if !options.tests.is_empty() {
        let mut tests = options.tests.clone();
        tests.sort();
        return Ok(tests);
    }
    fs::list_entries_sorted(&options.tests_root)
}
