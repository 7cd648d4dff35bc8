// src/commands/run.rs

use anyhow::Result;
use colored::*;
use std::{path::PathBuf, process::ExitCode};

use crate::{
    core::{models::RunId, planner::SuiteOptions, suite::Suite},
    infra::t,
    reporting::{console, generate_html_report, print_summary, write_json_report},
};

/// Optional report files requested on the command line.
#[derive(Debug, Clone, Default)]
pub struct ReportTargets {
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

/// Runs the whole suite and maps its statistics to a process exit code.
///
/// The exit code is the number of failed plus skipped cases, so a clean run
/// exits with 0. Report-writing problems are printed but never change it.
pub async fn execute(options: SuiteOptions, reports: ReportTargets) -> Result<ExitCode> {
    let run_id = RunId::generate();
    console::print_run_id(&run_id);

    let suite = Suite::new(options, run_id)?;
    let report = suite.run().await;

    print_summary(&report.totals);

    if let Some(path) = &reports.html {
        println!("{}", t!("report.writing_html", path = path.display()));
        if let Err(e) = generate_html_report(&report, path) {
            eprintln!("{} {:#}", t!("report.html_failed").red(), e);
        }
    }
    if let Some(path) = &reports.json {
        println!("{}", t!("report.writing_json", path = path.display()));
        if let Err(e) = write_json_report(&report, path) {
            eprintln!("{} {:#}", t!("report.json_failed").red(), e);
        }
    }

    Ok(ExitCode::from(report.exit_code()))
}
