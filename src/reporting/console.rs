//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the live, tree-shaped progress report and the final
//! summary. Output looks like:
//!
//! ```text
//! RUN    ./tests/Flame
//!   ├ basic
//!   │      Running test............................................[PASS] (1.52s, 3.10% faster)
//!   │      Checking result.........................................[PASS]
//!   └ 1 tests run, 1 checks passed
//! ```
//!
//! 此模块打印实时的树形进度报告和最终摘要。

use colored::*;
use std::io::Write;
use std::path::Path;

use crate::core::models::{
    BenchmarkVerdict, CapturedStreams, CheckResult, FailureReason, IgnoreReason, RunId, RunResult,
};
use crate::core::stats::{Category, SuiteStatistics};
use crate::infra::t;

const BRANCH: &str = "  ├ ";
const STEM: &str = "  │      ";
const LEAF: &str = "  └ ";

/// Lines kept from each end of a timed-out run's stdout.
const TIMEOUT_HEAD: usize = 5;
const TIMEOUT_TAIL: usize = 5;

pub fn print_run_id(run_id: &RunId) {
    println!("{}", t!("report.run_id", id = run_id));
}

pub fn print_ignored(dir: &Path, reason: IgnoreReason) {
    let line = match reason {
        IgnoreReason::NoInput => t!("report.ignore_no_input", dir = dir.display()),
        IgnoreReason::NoSections => t!("report.ignore", dir = dir.display()),
    };
    println!("{}", line.bright_black());
}

pub fn print_directory_header(dir: &Path) {
    println!("RUN    {}", dir.display().to_string().bold());
}

pub fn print_rejected(error: &str) {
    for line in error.lines() {
        println!("{}{}", STEM, t!("report.config_error", line = line).red());
    }
}

pub fn print_missing_binary(case_name: &str, binary: &Path) {
    println!(
        "{}{}",
        BRANCH,
        t!("report.missing_binary", name = case_name, path = binary.display())
            .yellow()
            .bold()
    );
}

pub fn print_case_header(case_name: &str) {
    println!("{}{}", BRANCH, case_name);
}

pub fn print_command(command_line: &str) {
    println!("{}{}", BRANCH, command_line);
}

/// Prints the "Running test....." prefix; the verdict follows on the same line.
pub fn begin_run() {
    begin_stage(&t!("report.running_test"));
}

/// Prints the "Checking result....." prefix; the verdict follows on the same line.
pub fn begin_check() {
    begin_stage(&t!("report.checking_result"));
}

fn begin_stage(label: &str) {
    print!("{}{:.<64}", STEM, label);
    let _ = std::io::stdout().flush();
}

/// Finishes the run line and, for failures, surfaces the captured output.
///
/// Timed-out runs only show the first and last lines of stdout to keep the
/// report bounded.
///
/// 结束运行行，并在失败时展示捕获的输出。
/// 超时的运行只显示 stdout 的首尾几行，以限制报告的长度。
pub fn print_run_result(result: &RunResult, benchmark: &BenchmarkVerdict, command_line: &str) {
    match result {
        RunResult::Passed { duration, .. } => {
            let timing = format!("{:.2}s", duration.as_secs_f64());
            let drift = match benchmark {
                BenchmarkVerdict::Faster { percent } => {
                    format!(", {}", t!("report.faster", percent = format!("{:.2}", percent)).blue())
                }
                BenchmarkVerdict::Slower { percent } => format!(
                    ", {}",
                    t!("report.slower", percent = format!("{:.2}", percent)).magenta()
                ),
                BenchmarkVerdict::Unchanged => format!(", {}", t!("report.no_change")),
                BenchmarkVerdict::NotApplicable => String::new(),
            };
            println!("[{}] ({}{})", result.status_str().green().bold(), timing, drift);
        }
        RunResult::Failed { reason, streams, .. } => {
            println!("[{}]", result.status_str().red());
            print_failure(command_line, reason, streams);
        }
        RunResult::TimedOut { streams, .. } => {
            println!("[{}]", result.status_str().red());
            print_tagged("CMD   ", command_line);
            for line in elide_lines(&streams.stdout, TIMEOUT_HEAD, TIMEOUT_TAIL) {
                match line {
                    Some(line) => print_tagged("STDOUT", line),
                    None => println!("{}{}", STEM, "        ............".red()),
                }
            }
        }
        RunResult::Skipped { .. } => println!("[{}]", result.status_str().yellow()),
        RunResult::DryRun => println!("[----]"),
    }
}

pub fn print_check_result(result: &CheckResult) {
    match result {
        CheckResult::Passed => println!("[{}]", result.status_str().green().bold()),
        CheckResult::Failed {
            command,
            reason,
            streams,
        } => {
            println!("[{}]", result.status_str().red());
            print_failure(command, reason, streams);
        }
        CheckResult::DryRun => println!("[----]"),
        CheckResult::Skipped => println!("[{}]", result.status_str().bright_black()),
    }
}

fn print_failure(command_line: &str, reason: &FailureReason, streams: &CapturedStreams) {
    match reason {
        FailureReason::ExitStatus { .. } => {
            print_tagged("CMD   ", command_line);
            for line in streams.stdout.lines() {
                print_tagged("STDOUT", line);
            }
            for line in streams.stderr.lines() {
                print_tagged("STDERR", line);
            }
        }
        FailureReason::Exception { message } => {
            for line in message.lines() {
                println!("{}{}", STEM, line.red());
            }
        }
    }
}

fn print_tagged(tag: &str, line: &str) {
    println!("{}{}", STEM, format!("{}: {}", tag, line).red());
}

/// Keeps the first `head` and last `tail` lines of `text` when it has more
/// than `head + tail` lines; `None` marks where lines were dropped.
///
/// 当 `text` 的行数超过 `head + tail` 时，仅保留前 `head` 行和后 `tail` 行；
/// `None` 标记被省略的位置。
pub fn elide_lines(text: &str, head: usize, tail: usize) -> Vec<Option<&str>> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= head + tail {
        return lines.into_iter().map(Some).collect();
    }
    let mut kept: Vec<Option<&str>> = lines[..head].iter().copied().map(Some).collect();
    kept.push(None);
    kept.extend(lines[lines.len() - tail..].iter().copied().map(Some));
    kept
}

/// Localized "N tests run"-style phrase for one counter.
pub fn category_phrase(category: Category, count: usize) -> String {
    let phrase = match category {
        Category::Run => t!("summary.run", count = count),
        Category::Checked => t!("summary.checked", count = count),
        Category::Failed => t!("summary.failed", count = count),
        Category::Skipped => t!("summary.skipped", count = count),
        Category::TimedOut => t!("summary.timed_out", count = count),
        Category::Faster => t!("summary.faster", count = count),
        Category::Slower => t!("summary.slower", count = count),
    };
    phrase.to_string()
}

fn colorize(category: Category, text: String) -> ColoredString {
    match category {
        Category::Run => text.blue(),
        Category::Checked => text.green(),
        Category::Failed | Category::TimedOut => text.red(),
        Category::Skipped => text.yellow().bold(),
        Category::Faster => text.blue(),
        Category::Slower => text.magenta(),
    }
}

/// One-line directory summary listing only the non-zero counters.
/// 单行目录摘要，仅列出非零计数。
pub fn print_directory_summary(stats: &SuiteStatistics) {
    let parts: Vec<String> = stats
        .nonzero()
        .into_iter()
        .map(|(category, count)| colorize(category, category_phrase(category, count)).to_string())
        .collect();
    println!("{}{}", LEAF, parts.join(", "));
}

/// Prints the final suite summary.
/// 打印最终的套件摘要。
pub fn print_summary(totals: &SuiteStatistics) {
    println!("\n{}", t!("summary.banner").bold());
    println!("{}", category_phrase(Category::Run, totals.run).green());
    println!("{}", t!("summary.verified", count = totals.checked).green().bold());
    if totals.failed == 0 {
        println!("{}", category_phrase(Category::Failed, 0).green().bold());
    } else {
        println!("{}", category_phrase(Category::Failed, totals.failed).red());
    }
    for category in [
        Category::Skipped,
        Category::Faster,
        Category::Slower,
        Category::TimedOut,
    ] {
        let count = totals.count(category);
        if count > 0 {
            println!("{}", colorize(category, category_phrase(category, count)));
        }
    }
    println!();
}
