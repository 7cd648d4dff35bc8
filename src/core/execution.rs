//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! Runs a planned case under its timeout and classifies the outcome, then
//! optionally hands the produced output to the directory's checker.
//! Nothing in here returns an error: every failure mode ends up inside a
//! [`RunResult`] or [`CheckResult`] so the suite always moves on.
//!
//! 在超时限制下运行已计划的用例并对结果分类，然后可选地将产生的输出交给目录中的检查器。
//! 此模块不返回任何错误：所有失败情况都被记录在 [`RunResult`] 或 [`CheckResult`] 中，
//! 因此套件总能继续执行。

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::core::case::PlannedCase;
use crate::core::models::{CapturedStreams, CheckResult, FailureReason, RunResult};
use crate::infra::command::{self, CapturedOutput, OutputDecodeError};
use crate::infra::fs;

/// Executes a planned case and classifies the outcome.
///
/// In dry-run mode nothing is spawned. Otherwise the captured streams are
/// decoded as strict ASCII, stripped of color escapes and written to
/// `stdout`/`stderr` inside the case output directory.
///
/// # Arguments
/// * `case` - The case to run
/// * `dry_run` - Resolve but do not spawn
///
/// 执行一个已计划的用例并对结果分类。
/// 在演练模式下不会派生任何进程。否则，捕获的输出流将按严格 ASCII 解码、
/// 去除颜色转义序列，并写入用例输出目录中的 `stdout`/`stderr` 文件。
pub async fn run_case(case: &PlannedCase, dry_run: bool) -> RunResult {
    if dry_run {
        return RunResult::DryRun;
    }

    let Some((program, args)) = case.argv.split_first() else {
        return exception(format!("empty command for case {}", case.name), Duration::ZERO);
    };
    let mut cmd = Command::new(program);
    cmd.args(args);

    let captured = match command::spawn_and_capture(cmd, Some(case.timeout)).await {
        Ok(captured) => captured,
        Err(e) => {
            return exception(format!("{}: {}", case.command_line, e), Duration::ZERO);
        }
    };

    if captured.timed_out() {
        // The timeout is the more useful verdict, so fall back to lossy decoding.
        let streams = decode_streams(&captured).unwrap_or_else(|_| lossy_streams(&captured));
        persist_streams(case, &streams);
        return RunResult::TimedOut {
            streams,
            limit: case.timeout,
        };
    }

    let duration = captured.elapsed;
    let streams = match decode_streams(&captured) {
        Ok(streams) => streams,
        Err(e) => {
            let streams = lossy_streams(&captured);
            persist_streams(case, &streams);
            return RunResult::Failed {
                reason: FailureReason::Exception {
                    message: e.to_string(),
                },
                streams,
                duration,
            };
        }
    };

    let success = captured.status.is_some_and(|status| status.success());
    if success {
        if let Err(e) = write_streams(case, &streams) {
            return RunResult::Failed {
                reason: FailureReason::Exception {
                    message: format!("{:#}", e),
                },
                streams,
                duration,
            };
        }
        RunResult::Passed { streams, duration }
    } else {
        persist_streams(case, &streams);
        RunResult::Failed {
            reason: FailureReason::ExitStatus {
                code: captured.status.and_then(|status| status.code()),
            },
            streams,
            duration,
        }
    }
}

/// The checker command line as displayed, e.g. `./test output_..._basic out.dat`.
pub fn checker_command_line(case: &PlannedCase, checker: &str) -> String {
    let mut line = format!("./{} {}", checker, case.label);
    if let Some(file) = &case.check_file {
        line.push(' ');
        line.push_str(file);
    }
    line
}

/// Runs the directory's checker against the output a case just produced.
///
/// The checker runs with `test_dir` as its working directory and receives the
/// case label plus the optional check file as arguments. It is bounded by the
/// same timeout as the case.
///
/// # Arguments
/// * `case` - The case whose output is checked
/// * `test_dir` - The test directory containing the checker
/// * `checker` - File name of the checker executable
/// * `dry_run` - Skip the invocation
///
/// 针对用例刚产生的输出运行目录中的检查器。
/// 检查器以 `test_dir` 为工作目录，接收用例标签和可选的检查文件作为参数，
/// 并受与用例相同的超时限制。
pub async fn run_checker(
    case: &PlannedCase,
    test_dir: &Path,
    checker: &str,
    dry_run: bool,
) -> CheckResult {
    if dry_run {
        return CheckResult::DryRun;
    }

    let command_line = checker_command_line(case, checker);
    let checker_path = match fs::absolute_path(test_dir) {
        Ok(dir) => dir.join(checker),
        Err(e) => return check_exception(command_line, format!("{:#}", e)),
    };

    let mut cmd = Command::new(&checker_path);
    cmd.arg(&case.label).current_dir(test_dir);
    if let Some(file) = &case.check_file {
        cmd.arg(file);
    }

    let captured = match command::spawn_and_capture(cmd, Some(case.timeout)).await {
        Ok(captured) => captured,
        Err(e) => return check_exception(command_line, format!("{}: {}", checker_path.display(), e)),
    };

    if captured.timed_out() {
        return CheckResult::Failed {
            command: command_line,
            reason: FailureReason::Exception {
                message: format!("checker timed out after {}s", case.timeout.as_secs()),
            },
            streams: lossy_streams(&captured),
        };
    }

    match captured.status {
        Some(status) if status.success() => CheckResult::Passed,
        status => CheckResult::Failed {
            command: command_line,
            reason: FailureReason::ExitStatus {
                code: status.and_then(|s| s.code()),
            },
            streams: decode_streams(&captured).unwrap_or_else(|_| lossy_streams(&captured)),
        },
    }
}

fn exception(message: String, duration: Duration) -> RunResult {
    RunResult::Failed {
        reason: FailureReason::Exception { message },
        streams: CapturedStreams::default(),
        duration,
    }
}

fn check_exception(command: String, message: String) -> CheckResult {
    CheckResult::Failed {
        command,
        reason: FailureReason::Exception { message },
        streams: CapturedStreams::default(),
    }
}

/// Strict ASCII decode of both streams, with color escapes removed.
/// 对两个输出流进行严格的 ASCII 解码，并移除颜色转义序列。
fn decode_streams(captured: &CapturedOutput) -> Result<CapturedStreams, OutputDecodeError> {
    let stdout = command::decode_ascii(&captured.stdout)?;
    let stderr = command::decode_ascii(&captured.stderr)?;
    Ok(CapturedStreams {
        stdout: command::strip_ansi(&stdout).into_owned(),
        stderr: command::strip_ansi(&stderr).into_owned(),
    })
}

fn lossy_streams(captured: &CapturedOutput) -> CapturedStreams {
    CapturedStreams {
        stdout: command::strip_ansi(&String::from_utf8_lossy(&captured.stdout)).into_owned(),
        stderr: command::strip_ansi(&String::from_utf8_lossy(&captured.stderr)).into_owned(),
    }
}

fn write_streams(case: &PlannedCase, streams: &CapturedStreams) -> anyhow::Result<()> {
    fs::write_capture(&case.output_dir, "stdout", &streams.stdout)?;
    fs::write_capture(&case.output_dir, "stderr", &streams.stderr)?;
    Ok(())
}

/// Best-effort write for runs that already failed; the verdict stands either way.
fn persist_streams(case: &PlannedCase, streams: &CapturedStreams) {
    if let Err(e) = write_streams(case, streams) {
        eprintln!("{:#}", e);
    }
}
