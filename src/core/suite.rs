//! # Suite Driver Module / 套件驱动模块
//!
//! Walks the test directories one at a time, expands each into cases, runs them
//! sequentially and folds the results into per-directory and suite totals.
//!
//! 逐个遍历测试目录，将每个目录展开为用例，顺序运行它们，并将结果汇总为目录级和套件级统计。

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::benchmark;
use crate::core::case::{CasePlan, CaseSpec, PlannedCase, plan_case};
use crate::core::config::{ConfigDocument, ConfigError, read_test_config};
use crate::core::execution::{checker_command_line, run_case, run_checker};
use crate::core::models::{
    BenchmarkVerdict, CaseReport, CheckResult, DirectoryOutcome, DirectoryReport, IgnoreReason,
    RunId, RunResult, SkipReason, SuiteReport,
};
use crate::core::planner::{SuiteOptions, discover_test_dirs};
use crate::core::stats::SuiteStatistics;
use crate::reporting::console;

/// An immutable, discovered set of test directories plus the options to run them with.
/// 已发现的、不可变的测试目录集合，以及运行它们所用的选项。
#[derive(Debug, Clone)]
pub struct Suite {
    options: SuiteOptions,
    run_id: RunId,
    directories: Vec<PathBuf>,
}

impl Suite {
    /// Validates `options` and discovers the test directories.
    ///
    /// # Errors
    /// Conflicting coverage switches, or a test root that cannot be listed.
    ///
    /// 校验 `options` 并发现测试目录。
    pub fn new(options: SuiteOptions, run_id: RunId) -> Result<Self> {
        options.validate()?;
        let directories = discover_test_dirs(&options)?;
        Ok(Self {
            options,
            run_id,
            directories,
        })
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Runs every directory in order and returns the aggregated report.
    /// 按顺序运行每个目录，并返回汇总报告。
    pub async fn run(&self) -> SuiteReport {
        let mut directories = Vec::with_capacity(self.directories.len());
        let mut totals = SuiteStatistics::default();

        for dir in &self.directories {
            let report = self.run_directory(dir).await;
            totals += report.stats;
            directories.push(report);
        }

        SuiteReport {
            run_id: self.run_id.clone(),
            directories,
            totals,
        }
    }

    /// Processes one test directory.
    ///
    /// Every case is parsed and resolved before the first one runs, so a
    /// configuration error rejects the directory without spawning anything.
    ///
    /// 处理单个测试目录。
    /// 所有用例都会在第一个用例运行之前完成解析，因此配置错误会在不派生任何进程的情况下拒绝该目录。
    pub async fn run_directory(&self, dir: &Path) -> DirectoryReport {
        if !dir.is_dir() || !dir.join(&self.options.input_file).is_file() {
            console::print_ignored(dir, IgnoreReason::NoInput);
            return ignored(dir, IgnoreReason::NoInput);
        }

        let document = match read_test_config(dir, &self.options.input_file, &self.options.marker)
        {
            Ok(document) => self.select_sections(document),
            Err(e) => return self.reject(dir, format!("{:#}", e)),
        };
        if document.is_empty() {
            console::print_ignored(dir, IgnoreReason::NoSections);
            return ignored(dir, IgnoreReason::NoSections);
        }

        let plans = match self.plan_directory(dir, &document) {
            Ok(plans) => plans,
            Err(e) => return self.reject(dir, e.to_string()),
        };

        console::print_directory_header(dir);

        let mut stats = SuiteStatistics::default();
        let mut cases = Vec::new();
        for plan in plans {
            let report = match plan {
                CasePlan::Excluded { .. } => continue,
                CasePlan::MissingBinary { name, binary } => {
                    console::print_missing_binary(&name, &binary);
                    CaseReport {
                        name,
                        command: binary.display().to_string(),
                        run: RunResult::Skipped {
                            reason: SkipReason::MissingBinary { path: binary },
                        },
                        check: CheckResult::Skipped,
                        benchmark: BenchmarkVerdict::NotApplicable,
                    }
                }
                CasePlan::Run(case) => self.run_planned(dir, case).await,
            };
            stats.record_case(&report);
            cases.push(report);
        }

        console::print_directory_summary(&stats);

        DirectoryReport {
            path: dir.to_path_buf(),
            outcome: DirectoryOutcome::Completed { cases },
            stats,
        }
    }

    fn select_sections(&self, mut document: ConfigDocument) -> ConfigDocument {
        if let Some(names) = self.options.sections.as_deref().filter(|n| !n.is_empty()) {
            document.retain_named(names);
        }
        document
    }

    fn plan_directory(
        &self,
        dir: &Path,
        document: &ConfigDocument,
    ) -> Result<Vec<CasePlan>, ConfigError> {
        document
            .sections()
            .iter()
            .map(|section| {
                let spec = CaseSpec::from_section(section)?;
                plan_case(&spec, &self.options, dir, &self.run_id)
            })
            .collect()
    }

    fn reject(&self, dir: &Path, error: String) -> DirectoryReport {
        console::print_directory_header(dir);
        console::print_rejected(&error);
        let mut stats = SuiteStatistics::default();
        stats.record_rejection();
        DirectoryReport {
            path: dir.to_path_buf(),
            outcome: DirectoryOutcome::Rejected { error },
            stats,
        }
    }

    /// Runs one case, scores its timing and, when enabled, checks its output.
    async fn run_planned(&self, dir: &Path, case: PlannedCase) -> CaseReport {
        let dry_run = self.options.dry_run;

        console::print_case_header(&case.name);
        if self.options.echo_commands {
            console::print_command(&case.command_line);
        }
        console::begin_run();
        let run = run_case(&case, dry_run).await;

        let benchmark = match &run {
            RunResult::Passed { duration, .. } => {
                benchmark::compare(duration.as_secs_f64(), case.benchmark)
            }
            _ => BenchmarkVerdict::NotApplicable,
        };
        console::print_run_result(&run, &benchmark, &case.command_line);

        let should_check = case.check && matches!(run, RunResult::Passed { .. } | RunResult::DryRun);
        let check = if should_check {
            if self.options.echo_commands {
                console::print_command(&checker_command_line(&case, &self.options.checker));
            }
            console::begin_check();
            let check = run_checker(&case, dir, &self.options.checker, dry_run).await;
            console::print_check_result(&check);
            check
        } else {
            CheckResult::Skipped
        };

        CaseReport {
            name: case.name,
            command: case.command_line,
            run,
            check,
            benchmark,
        }
    }
}

fn ignored(dir: &Path, reason: IgnoreReason) -> DirectoryReport {
    DirectoryReport {
        path: dir.to_path_buf(),
        outcome: DirectoryOutcome::Ignored { reason },
        stats: SuiteStatistics::default(),
    }
}
