//! # Statistics Module / 统计模块
//!
//! Counters accumulated per test directory and re-summed for the whole suite.
//! The suite exit status is derived from them.
//!
//! 按测试目录累积、并在整个套件层面重新求和的计数器。套件的退出状态由它们得出。

use serde::Serialize;
use std::ops::AddAssign;

use crate::core::models::{BenchmarkVerdict, CaseReport, CheckResult, RunResult};

/// Pass/fail/skip/timeout/performance counters.
/// 通过/失败/跳过/超时/性能计数器。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteStatistics {
    /// Runs that exited zero within their time limit.
    pub run: usize,
    /// Checker invocations that passed.
    pub checked: usize,
    /// Failed runs, timed-out runs, failed checks and rejected directories.
    pub failed: usize,
    /// Cases that could not run unexpectedly (missing binary).
    pub skipped: usize,
    pub timed_out: usize,
    pub faster: usize,
    pub slower: usize,
}

/// A counter category, used when rendering non-zero counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Run,
    Checked,
    Failed,
    Skipped,
    TimedOut,
    Faster,
    Slower,
}

impl SuiteStatistics {
    /// Folds one attempted case into the counters.
    /// 将一个已尝试的用例计入计数器。
    pub fn record_case(&mut self, case: &CaseReport) {
        match &case.run {
            RunResult::Passed { .. } => self.run += 1,
            RunResult::Failed { .. } => self.failed += 1,
            RunResult::TimedOut { .. } => {
                self.timed_out += 1;
                self.failed += 1;
            }
            RunResult::Skipped { .. } => self.skipped += 1,
            RunResult::DryRun => {}
        }

        match &case.check {
            CheckResult::Passed => self.checked += 1,
            CheckResult::Failed { .. } => self.failed += 1,
            CheckResult::DryRun | CheckResult::Skipped => {}
        }

        match case.benchmark {
            BenchmarkVerdict::Faster { .. } => self.faster += 1,
            BenchmarkVerdict::Slower { .. } => self.slower += 1,
            BenchmarkVerdict::Unchanged | BenchmarkVerdict::NotApplicable => {}
        }
    }

    /// A directory whose configuration could not be used counts as one failure.
    pub fn record_rejection(&mut self) {
        self.failed += 1;
    }

    /// Process exit status: failures plus unexpected skips, saturated at 255.
    ///
    /// Deliberate exclusions (dimension filter, serial mode, coverage-only mode)
    /// never reach these counters and so never affect the status.
    ///
    /// 进程退出状态：失败数加上意外跳过数，上限为 255。
    /// 有意的排除（维度过滤、串行模式、仅覆盖率模式）不会计入这些计数器，因此不影响退出状态。
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.failed + self.skipped).unwrap_or(u8::MAX)
    }

    pub fn is_clean(&self) -> bool {
        self.exit_code() == 0
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Run => self.run,
            Category::Checked => self.checked,
            Category::Failed => self.failed,
            Category::Skipped => self.skipped,
            Category::TimedOut => self.timed_out,
            Category::Faster => self.faster,
            Category::Slower => self.slower,
        }
    }

    /// Categories with a non-zero count, in reporting order.
    pub fn nonzero(&self) -> Vec<(Category, usize)> {
        [
            Category::Run,
            Category::Checked,
            Category::Failed,
            Category::Skipped,
            Category::TimedOut,
            Category::Faster,
            Category::Slower,
        ]
        .into_iter()
        .map(|c| (c, self.count(c)))
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

impl AddAssign for SuiteStatistics {
    fn add_assign(&mut self, other: Self) {
        self.run += other.run;
        self.checked += other.checked;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.timed_out += other.timed_out;
        self.faster += other.faster;
        self.slower += other.slower;
    }
}
