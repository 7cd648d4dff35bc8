//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! the run identifier, per-case run and check outcomes, benchmark verdicts and
//! the per-directory and whole-suite reports built from them.
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 运行标识符、每个用例的运行与检查结果、基准判定，
//! 以及由它们构建的目录级和套件级报告。

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::stats::SuiteStatistics;
use crate::infra::t;

/// A unique per-invocation token used to namespace every output artifact.
///
/// It is created once by the caller and threaded through suite construction,
/// so two suites in the same process never share output paths by accident.
///
/// 每次调用唯一的标记，用于为所有输出产物划分命名空间。
/// 它由调用方创建一次并传入套件构建过程，因此同一进程中的两个套件不会意外共享输出路径。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds `output_<YYYY-MM-DD_HH.MM.SS>_<host>` from a timestamp and host name.
    pub fn from_parts(now: DateTime<Local>, host: &str) -> Self {
        Self(format!("output_{}_{}", now.format("%Y-%m-%d_%H.%M.%S"), host))
    }

    /// A run identifier for the current time on this host.
    pub fn generate() -> Self {
        Self::from_parts(Local::now(), &crate::infra::system::hostname())
    }

    /// The identifier qualified with a case name, e.g. `output_..._host_basic`.
    /// Used both as the output directory name and as the checker's first argument.
    pub fn case_label(&self, case_name: &str) -> String {
        format!("{}_{}", self.0, case_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded, escape-stripped stdout and stderr of a process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedStreams {
    pub stdout: String,
    pub stderr: String,
}

/// Enumerates the ways a run or a check can fail.
/// 枚举运行或检查可能失败的方式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The process ran to completion with a non-zero exit status.
    /// `code` is absent when the process was terminated by a signal.
    /// 进程运行结束但退出状态非零。若进程被信号终止，则 `code` 不存在。
    ExitStatus { code: Option<i32> },
    /// Spawning, decoding or writing output failed before a verdict could be made.
    /// 在得出结论之前，派生、解码或写入输出失败。
    Exception { message: String },
}

/// Why a case was counted as skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The resolved simulation binary is not present on disk.
    MissingBinary { path: PathBuf },
}

/// Outcome of executing one test case.
/// 执行单个测试用例的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunResult {
    /// Exit status zero within the time limit.
    Passed {
        streams: CapturedStreams,
        duration: Duration,
    },
    /// Non-zero exit, or an error while spawning or decoding.
    Failed {
        reason: FailureReason,
        streams: CapturedStreams,
        duration: Duration,
    },
    /// The process exceeded its time limit and was killed.
    TimedOut {
        streams: CapturedStreams,
        limit: Duration,
    },
    /// The case was not run and counts against the suite.
    Skipped { reason: SkipReason },
    /// Dry-run mode: the command was resolved but never spawned.
    DryRun,
}

impl RunResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, RunResult::Passed { .. })
    }

    /// Wall-clock duration for runs that actually finished.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            RunResult::Passed { duration, .. } | RunResult::Failed { duration, .. } => {
                Some(*duration)
            }
            RunResult::TimedOut { limit, .. } => Some(*limit),
            RunResult::Skipped { .. } | RunResult::DryRun => None,
        }
    }

    /// Gets the localized status label for display.
    /// 获取用于显示的本地化状态标签。
    pub fn status_str(&self) -> String {
        match self {
            RunResult::Passed { .. } => t!("status.pass").to_string(),
            RunResult::Failed { .. } => t!("status.fail").to_string(),
            RunResult::TimedOut { .. } => t!("status.timeout").to_string(),
            RunResult::Skipped { .. } => t!("status.skipped").to_string(),
            RunResult::DryRun => t!("status.dry_run").to_string(),
        }
    }

    /// Gets the CSS class for the status in HTML reports.
    pub fn status_class(&self) -> &'static str {
        match self {
            RunResult::Passed { .. } => "status-passed",
            RunResult::Failed { .. } => "status-failed",
            RunResult::TimedOut { .. } => "status-timeout",
            RunResult::Skipped { .. } => "status-skipped",
            RunResult::DryRun => "status-dry-run",
        }
    }
}

/// Outcome of invoking a directory's checker after a run.
/// 运行结束后调用目录检查器的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckResult {
    Passed,
    Failed {
        command: String,
        reason: FailureReason,
        streams: CapturedStreams,
    },
    DryRun,
    /// Checking was disabled for the case, or the run gave nothing to check.
    Skipped,
}

impl CheckResult {
    pub fn status_str(&self) -> String {
        match self {
            CheckResult::Passed => t!("status.pass").to_string(),
            CheckResult::Failed { .. } => t!("status.fail").to_string(),
            CheckResult::DryRun => t!("status.dry_run").to_string(),
            CheckResult::Skipped => t!("status.not_checked").to_string(),
        }
    }
}

/// Informational comparison of a measured run time against a stored reference.
/// 将测得的运行时间与存储的参考值进行比较的信息性结果。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum BenchmarkVerdict {
    Faster { percent: f64 },
    Slower { percent: f64 },
    Unchanged,
    NotApplicable,
}

/// Everything recorded about one case that was attempted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub name: String,
    /// The command line as it was (or would have been) run.
    pub command: String,
    pub run: RunResult,
    pub check: CheckResult,
    pub benchmark: BenchmarkVerdict,
}

/// Why a directory contributed nothing to the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Not a directory, or no input file inside it.
    NoInput,
    /// The input file declares no (selected) sections.
    NoSections,
}

/// What happened to one test directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DirectoryOutcome {
    Ignored { reason: IgnoreReason },
    /// A configuration error prevented every case in the directory from running.
    Rejected { error: String },
    Completed { cases: Vec<CaseReport> },
}

/// Result of processing one test directory.
/// 处理单个测试目录的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryReport {
    pub path: PathBuf,
    pub outcome: DirectoryOutcome,
    pub stats: SuiteStatistics,
}

impl DirectoryReport {
    pub fn cases(&self) -> &[CaseReport] {
        match &self.outcome {
            DirectoryOutcome::Completed { cases } => cases,
            _ => &[],
        }
    }
}

/// Result of a whole suite invocation.
/// 整个套件调用的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub run_id: RunId,
    pub directories: Vec<DirectoryReport>,
    pub totals: SuiteStatistics,
}

impl SuiteReport {
    /// Process exit status for this report, see [`SuiteStatistics::exit_code`].
    pub fn exit_code(&self) -> u8 {
        self.totals.exit_code()
    }
}
