//! # Suite Integration Tests / 套件集成测试
//!
//! End-to-end suite runs against shell-script stand-ins for the simulation
//! binary and the per-directory checker.
//!
//! 使用 shell 脚本替代仿真程序和目录检查器，端到端地运行测试套件。

#![cfg(unix)]

mod common;

use std::fs;
use std::time::Duration;

use common::{Workspace, output_dirs};
use sim_test_runner::core::planner::SuiteOptions;
use sim_test_runner::models::{
    CheckResult, DirectoryOutcome, FailureReason, IgnoreReason, RunId, RunResult, SuiteReport,
};
use sim_test_runner::suite::Suite;

fn run_id() -> RunId {
    RunId::new("output_2024-01-01_00.00.00_testhost")
}

async fn run_suite(options: SuiteOptions) -> SuiteReport {
    Suite::new(options, run_id())
        .expect("suite should build")
        .run()
        .await
}

#[tokio::test]
async fn test_pass_with_check() {
    let ws = Workspace::new();
    ws.add_binary(2, "echo \"running $1\"\necho \"$@\" > /dev/null");
    let dir = ws.add_test("flame", "[basic]\ndim = 2\nargs = max_step=1");
    ws.add_checker(&dir, "test -f \"$1/stdout\"");

    let report = run_suite(ws.options()).await;

    assert_eq!(report.totals.run, 1);
    assert_eq!(report.totals.checked, 1);
    assert_eq!(report.totals.failed, 0);
    assert_eq!(report.exit_code(), 0);

    let case = &report.directories[0].cases()[0];
    assert!(case.run.is_passed());
    assert_eq!(case.check, CheckResult::Passed);

    let label = run_id().case_label("basic");
    let stdout = fs::read_to_string(dir.join(&label).join("stdout")).unwrap();
    assert!(stdout.starts_with("running "));
    assert!(dir.join(&label).join("stderr").is_file());
}

#[tokio::test]
async fn test_check_file_is_passed_to_checker() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    let dir = ws.add_test("flame", "[basic]\ncheck-file = reference.dat");
    ws.add_checker(&dir, "[ \"$2\" = reference.dat ] && [ -d \"$1\" ]");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.checked, 1);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_failing_binary_skips_check() {
    let ws = Workspace::new();
    ws.add_binary(3, "echo boom >&2\nexit 2");
    let dir = ws.add_test("flame", "[basic]");
    let marker = dir.join("checker-ran");
    ws.add_checker(&dir, &format!("touch {}", marker.display()));

    let report = run_suite(ws.options()).await;

    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.exit_code(), 1);
    let case = &report.directories[0].cases()[0];
    match &case.run {
        RunResult::Failed {
            reason: FailureReason::ExitStatus { code },
            streams,
            ..
        } => {
            assert_eq!(*code, Some(2));
            assert_eq!(streams.stderr, "boom\n");
        }
        other => panic!("expected a failed run, got {:?}", other),
    }
    assert_eq!(case.check, CheckResult::Skipped);
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_failing_checker() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    let dir = ws.add_test("flame", "[basic]");
    ws.add_checker(&dir, "echo 'mismatch at cell 4'\nexit 1");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.run, 1);
    assert_eq!(report.totals.checked, 0);
    assert_eq!(report.totals.failed, 1);
    match &report.directories[0].cases()[0].check {
        CheckResult::Failed {
            command, streams, ..
        } => {
            assert_eq!(command, &format!("./test {}", run_id().case_label("basic")));
            assert_eq!(streams.stdout, "mismatch at cell 4\n");
        }
        other => panic!("expected a failed check, got {:?}", other),
    }
}

#[tokio::test]
async fn test_check_disabled() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    ws.add_test("flame", "[basic]\ncheck = no");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.run, 1);
    assert_eq!(report.totals.checked, 0);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_missing_binary_is_skipped() {
    let ws = Workspace::new();
    ws.add_test("flame", "[basic]\ndim = 2");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.skipped, 1);
    assert_eq!(report.totals.run, 0);
    assert_eq!(report.exit_code(), 1);
    assert!(matches!(
        report.directories[0].cases()[0].run,
        RunResult::Skipped { .. }
    ));
}

#[tokio::test]
async fn test_timeout_kills_process_group() {
    let ws = Workspace::new();
    let pid_file = ws.path().join("grandchild.pid");
    ws.add_binary(
        3,
        &format!(
            "echo started\nsleep 30 &\necho $! > {}\nwait",
            pid_file.display()
        ),
    );
    let dir = ws.add_test("slow", "[basic]\ntimeout = 1");
    let marker = dir.join("checker-ran");
    ws.add_checker(&dir, &format!("touch {}", marker.display()));

    let report = run_suite(ws.options()).await;

    assert_eq!(report.totals.timed_out, 1);
    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.exit_code(), 1);
    match &report.directories[0].cases()[0].run {
        RunResult::TimedOut { streams, limit } => {
            assert_eq!(*limit, Duration::from_secs(1));
            assert_eq!(streams.stdout, "started\n");
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(!marker.exists());

    let pid: u32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
    for _ in 0..50 {
        if !common::process_alive(pid) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!common::process_alive(pid));
}

#[tokio::test]
async fn test_cmd_with_other_keys_rejects_directory() {
    let ws = Workspace::new();
    let marker = ws.path().join("ran");
    ws.add_binary(3, &format!("touch {}", marker.display()));
    // The valid section comes first; it must not run either.
    ws.add_test("mixed", "[good]\n[bad]\ncmd = ./run.sh\nnprocs = 2");

    let report = run_suite(ws.options()).await;

    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.totals.run, 0);
    match &report.directories[0].outcome {
        DirectoryOutcome::Rejected { error } => {
            assert!(error.contains("if 'cmd' is specified no other parameters can be set"));
        }
        other => panic!("expected a rejected directory, got {:?}", other),
    }
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_malformed_config_rejects_directory() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    ws.add_test("broken", "nprocs = 2\n[basic]");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.failed, 1);
    assert!(matches!(
        report.directories[0].outcome,
        DirectoryOutcome::Rejected { .. }
    ));
}

#[tokio::test]
async fn test_serial_mode_excludes_without_counting() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    ws.add_test("flame", "[one]\ncheck = no\n[many]\nnprocs = 4");

    let options = SuiteOptions {
        serial: true,
        ..ws.options()
    };
    let report = run_suite(options).await;

    let names: Vec<&str> = report.directories[0]
        .cases()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["one"]);
    assert_eq!(report.totals.run, 1);
    assert_eq!(report.totals.skipped, 0);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_ignored_directories() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.tests_root().join("no_input")).unwrap();
    fs::write(ws.tests_root().join("README"), "not a test").unwrap();
    ws.add_test("no_sections", "");

    let report = run_suite(ws.options()).await;

    assert_eq!(report.directories.len(), 3);
    let reasons: Vec<IgnoreReason> = report
        .directories
        .iter()
        .map(|d| match d.outcome {
            DirectoryOutcome::Ignored { reason } => reason,
            ref other => panic!("expected ignored, got {:?}", other),
        })
        .collect();
    // Sorted: README, no_input, no_sections
    assert_eq!(
        reasons,
        vec![
            IgnoreReason::NoInput,
            IgnoreReason::NoInput,
            IgnoreReason::NoSections
        ]
    );
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_section_filter() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    ws.add_test("flame", "[a]\ncheck = no\n[b]\ncheck = no\n[c]\ncheck = no");
    ws.add_test("other", "[z]\ncheck = no");

    let options = SuiteOptions {
        sections: Some(vec!["c".to_string(), "a".to_string()]),
        ..ws.options()
    };
    let report = run_suite(options).await;

    let names: Vec<&str> = report.directories[0]
        .cases()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "c"]);
    assert!(matches!(
        report.directories[1].outcome,
        DirectoryOutcome::Ignored {
            reason: IgnoreReason::NoSections
        }
    ));
    assert_eq!(report.totals.run, 2);
}

#[tokio::test]
async fn test_ansi_sequences_are_stripped() {
    let ws = Workspace::new();
    ws.add_binary(3, "printf '\\033[32mconverged\\033[0m\\n'");
    let dir = ws.add_test("flame", "[basic]\ncheck = no");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.run, 1);

    let outputs = output_dirs(&dir);
    assert_eq!(outputs.len(), 1);
    assert_eq!(
        fs::read_to_string(outputs[0].join("stdout")).unwrap(),
        "converged\n"
    );
}

#[tokio::test]
async fn test_non_ascii_output_fails() {
    let ws = Workspace::new();
    ws.add_binary(3, "printf 'temp \\302\\260C\\n'");
    ws.add_test("flame", "[basic]\ncheck = no");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.failed, 1);
    assert!(matches!(
        report.directories[0].cases()[0].run,
        RunResult::Failed {
            reason: FailureReason::Exception { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_dry_run_spawns_nothing() {
    let ws = Workspace::new();
    let marker = ws.path().join("ran");
    ws.add_binary(3, &format!("touch {}", marker.display()));
    let dir = ws.add_test("flame", "[basic]");
    ws.add_checker(&dir, &format!("touch {}", marker.display()));

    let options = SuiteOptions {
        dry_run: true,
        ..ws.options()
    };
    let report = run_suite(options).await;

    let case = &report.directories[0].cases()[0];
    assert_eq!(case.run, RunResult::DryRun);
    assert_eq!(case.check, CheckResult::DryRun);
    assert_eq!(report.exit_code(), 0);
    assert!(!marker.exists());
    assert!(output_dirs(&dir).is_empty());
}

#[tokio::test]
async fn test_explicit_test_directories() {
    let ws = Workspace::new();
    ws.add_binary(3, "exit 0");
    let picked = ws.add_test("picked", "[basic]\ncheck = no");
    ws.add_test("other", "[basic]\ncheck = no");

    let options = SuiteOptions {
        tests: vec![picked.clone()],
        ..ws.options()
    };
    let suite = Suite::new(options, run_id()).unwrap();
    assert_eq!(suite.directories(), &[picked.clone()]);
    assert_eq!(suite.run_id(), &run_id());

    let report = suite.run().await;
    assert_eq!(report.directories.len(), 1);
    assert_eq!(report.directories[0].path, picked);
}

#[tokio::test]
async fn test_literal_command() {
    let ws = Workspace::new();
    let marker = ws.path().join("literal-ran");
    let dir = ws.add_test("literal", &format!("[custom]\ncmd = touch {}", marker.display()));
    ws.add_checker(&dir, "exit 0");

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.run, 1);
    assert_eq!(report.totals.checked, 1);
    assert_eq!(report.exit_code(), 0);
    assert!(marker.exists());
}

#[test]
fn test_conflicting_coverage_options() {
    let ws = Workspace::new();
    let options = SuiteOptions {
        coverage: true,
        no_coverage: true,
        ..ws.options()
    };
    let err = Suite::new(options, run_id()).unwrap_err();
    assert!(err.to_string().contains("cannot specify both --coverage and --no-coverage"));
}

#[tokio::test]
async fn test_literal_command_passes_shell_characters_through() {
    let ws = Workspace::new();
    let recorded = ws.path().join("argv.txt");
    let recorder = ws.path().join("record.sh");
    common::write_script(
        &recorder,
        &format!("printf '%s\\n' \"$@\" > {}", recorded.display()),
    );
    let dir = ws.add_test(
        "literal",
        &format!(
            "[custom]\ncmd = {} $NO_SUCH_VARIABLE ~/out title=don't",
            recorder.display()
        ),
    );
    ws.add_checker(&dir, "exit 0");

    let report = run_suite(ws.options()).await;
    assert!(matches!(
        report.directories[0].outcome,
        DirectoryOutcome::Completed { .. }
    ));
    assert_eq!(report.totals.run, 1);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        fs::read_to_string(&recorded).unwrap(),
        "$NO_SUCH_VARIABLE\n~/out\ntitle=don't\n"
    );
}

#[tokio::test]
async fn test_args_with_quotes_reach_the_binary() {
    let ws = Workspace::new();
    ws.add_binary(3, "printf '%s\\n' \"$@\"");
    let dir = ws.add_test(
        "quoted",
        "[a]\nargs = title=don't path=C:\\runs\ncheck = no",
    );

    let report = run_suite(ws.options()).await;
    assert_eq!(report.totals.run, 1);
    assert_eq!(report.totals.failed, 0);
    assert_eq!(report.exit_code(), 0);

    let stdout = fs::read_to_string(dir.join(run_id().case_label("a")).join("stdout")).unwrap();
    let args: Vec<&str> = stdout.lines().collect();
    assert_eq!(&args[1..3], &["title=don't", "path=C:\\runs"]);
}

#[tokio::test]
async fn test_repeated_runs_classify_identically() {
    let ws = Workspace::new();
    ws.add_binary(3, "case \"$*\" in *fail=yes*) exit 3;; esac");
    let flame = ws.add_test("flame", "[ok]\n[broken]\nargs = fail=yes\ncheck = no");
    ws.add_checker(&flame, "test -f \"$1/stdout\"");
    ws.add_test("plane", "[missing]\ndim = 2");

    let first_id = RunId::new("output_2024-01-01_00.00.00_testhost");
    let second_id = RunId::new("output_2024-01-01_00.00.05_testhost");
    let first = Suite::new(ws.options(), first_id.clone()).unwrap().run().await;
    let second = Suite::new(ws.options(), second_id.clone()).unwrap().run().await;

    let classify = |report: &SuiteReport| {
        report
            .directories
            .iter()
            .flat_map(|dir| {
                dir.cases().iter().map(move |case| {
                    (
                        dir.path.clone(),
                        case.name.clone(),
                        case.run.status_class(),
                        case.check.status_str(),
                    )
                })
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(classify(&first), classify(&second));
    assert_eq!(first.totals, second.totals);
    assert_eq!(first.totals.run, 1);
    assert_eq!(first.totals.checked, 1);
    assert_eq!(first.totals.failed, 1);
    assert_eq!(first.totals.skipped, 1);

    assert_eq!(
        output_dirs(&flame),
        vec![
            flame.join(first_id.case_label("broken")),
            flame.join(first_id.case_label("ok")),
            flame.join(second_id.case_label("broken")),
            flame.join(second_id.case_label("ok")),
        ]
    );
}
