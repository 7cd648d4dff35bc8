//! # HTML Reporting Module / HTML 报告模块
//!
//! This module handles the generation of HTML test reports.
//! It creates a styled, self-contained HTML file with suite statistics, one
//! table per test directory and collapsible output for failed cases.
//!
//! 此模块处理 HTML 测试报告的生成。
//! 它创建一个样式化的独立 HTML 文件，包含套件统计、每个测试目录一张表格，
//! 以及失败用例可折叠的输出。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::{
    BenchmarkVerdict, CaseReport, CheckResult, DirectoryOutcome, FailureReason, IgnoreReason,
    RunResult, SuiteReport,
};
use crate::core::stats::Category;
use crate::infra::t;
use crate::reporting::console::category_phrase;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Embedded JavaScript for HTML report interactivity / HTML 报告交互性的嵌入式 JavaScript
const HTML_SCRIPT: &str = include_str!("assets/report.js");

/// Generates an HTML report for a finished suite.
///
/// # Arguments / 参数
/// * `report` - The suite report to render
///              要渲染的套件报告
/// * `output_path` - The file path where the HTML report will be saved
///                   保存 HTML 报告的文件路径
///
/// # Errors / 错误
/// Returns an error if the output file cannot be written.
/// 如果无法写入输出文件，则返回错误。
pub fn generate_html_report(report: &SuiteReport, output_path: &Path) -> Result<()> {
    let markup = render(report);
    fs::write(output_path, markup.into_string())
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))
}

fn render(report: &SuiteReport) -> Markup {
    let totals = &report.totals;
    let summary = [
        (Category::Run, "passed-text"),
        (Category::Checked, "passed-text"),
        (Category::Failed, "failed-text"),
        (Category::Skipped, "skipped-text"),
        (Category::TimedOut, "failed-text"),
    ];

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title").to_string()) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header").to_string()) }
                p.run-id { (report.run_id.as_str()) }
                div.summary-container {
                    @for (category, class) in summary {
                        div.summary-item {
                            span class={"count " (class)} { (totals.count(category)) }
                            span.label { (category_phrase(category, totals.count(category))) }
                        }
                    }
                }
                @for (dir_index, dir) in report.directories.iter().enumerate() {
                    h2 { (dir.path.display().to_string()) }
                    @match &dir.outcome {
                        DirectoryOutcome::Ignored { reason } => {
                            p.ignored { (ignored_label(*reason)) }
                        }
                        DirectoryOutcome::Rejected { error } => {
                            p.rejected { (error) }
                        }
                        DirectoryOutcome::Completed { cases } => {
                            (case_table(dir_index, cases))
                        }
                    }
                }
                script { (PreEscaped(HTML_SCRIPT)) }
            }
        }
    }
}

fn case_table(dir_index: usize, cases: &[CaseReport]) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { (t!("html_report.table.header.name").to_string()) }
                    th.status-col { (t!("html_report.table.header.run").to_string()) }
                    th.status-col { (t!("html_report.table.header.check").to_string()) }
                    th.duration-cell { (t!("html_report.table.header.duration").to_string()) }
                    th { (t!("html_report.table.header.benchmark").to_string()) }
                }
            }
            tbody {
                @for (case_index, case) in cases.iter().enumerate() {
                    @let output_id = format!("output-{}-{}", dir_index, case_index);
                    @let details = failure_details(case);
                    tr {
                        td { (case.name) }
                        td.status-col {
                            div class={"status-cell " (case.run.status_class())} { (case.run.status_str()) }
                            @if details.is_some() {
                                div.output-toggle onclick={"toggleOutput('" (output_id) "')"} {
                                    (t!("html_report.toggle_output").to_string())
                                }
                            }
                        }
                        td.status-col { (case.check.status_str()) }
                        td.duration-cell {
                            @match case.run.duration() {
                                Some(d) => { (format!("{:.2}s", d.as_secs_f64())) }
                                None => { "N/A" }
                            }
                        }
                        td { (benchmark_label(&case.benchmark)) }
                    }
                    @if let Some(details) = details {
                        tr id=(output_id) style="display:none;" {
                            td colspan="5" { pre.output-content { (details) } }
                        }
                    }
                }
            }
        }
    }
}

fn ignored_label(reason: IgnoreReason) -> String {
    match reason {
        IgnoreReason::NoInput => t!("html_report.ignored_no_input").to_string(),
        IgnoreReason::NoSections => t!("html_report.ignored").to_string(),
    }
}

fn benchmark_label(verdict: &BenchmarkVerdict) -> String {
    match verdict {
        BenchmarkVerdict::Faster { percent } => {
            t!("report.faster", percent = format!("{:.2}", percent)).to_string()
        }
        BenchmarkVerdict::Slower { percent } => {
            t!("report.slower", percent = format!("{:.2}", percent)).to_string()
        }
        BenchmarkVerdict::Unchanged => t!("report.no_change").to_string(),
        BenchmarkVerdict::NotApplicable => String::new(),
    }
}

/// Text shown under a failed run or check, if any.
fn failure_details(case: &CaseReport) -> Option<String> {
    let mut text = String::new();
    match &case.run {
        RunResult::Failed {
            reason, streams, ..
        } => append_failure(&mut text, &case.command, reason, &streams.stdout, &streams.stderr),
        RunResult::TimedOut { streams, .. } => {
            append_failure(
                &mut text,
                &case.command,
                &FailureReason::ExitStatus { code: None },
                &streams.stdout,
                &streams.stderr,
            );
        }
        _ => {}
    }
    if let CheckResult::Failed {
        command,
        reason,
        streams,
    } = &case.check
    {
        append_failure(&mut text, command, reason, &streams.stdout, &streams.stderr);
    }
    (!text.is_empty()).then_some(text)
}

fn append_failure(
    text: &mut String,
    command: &str,
    reason: &FailureReason,
    stdout: &str,
    stderr: &str,
) {
    match reason {
        FailureReason::ExitStatus { .. } => {
            text.push_str(&format!("CMD   : {}\n", command));
            for line in stdout.lines() {
                text.push_str(&format!("STDOUT: {}\n", line));
            }
            for line in stderr.lines() {
                text.push_str(&format!("STDERR: {}\n", line));
            }
        }
        FailureReason::Exception { message } => {
            text.push_str(message);
            text.push('\n');
        }
    }
}
