// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf, process::ExitCode, time::Duration};

use crate::commands::run::ReportTargets;
use crate::core::planner::SuiteOptions;
use crate::core::settings::SuiteSettings;
use crate::{commands, infra::t};

/// Finds the value of `--<name> <VALUE>` before the full CLI is built.
/// Both the help text language and the settings file must be known up front.
fn pre_parse_value(name: &str) -> Option<String> {
    let flag = format!("--{}", name);
    let prefix = format!("{}=", flag);
    let args: Vec<String> = env::args().collect();
    args.iter().enumerate().find_map(|(pos, arg)| {
        if *arg == flag {
            args.get(pos + 1).cloned()
        } else {
            arg.strip_prefix(&prefix).map(str::to_string)
        }
    })
}

fn flag(name: &'static str, help: String) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::SetTrue)
}

fn build_cli(locale: &str) -> Command {
    Command::new("sim-test-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .arg(
            Arg::new("tests")
                .help(t!("cli.tests", locale = locale).to_string())
                .value_name("TEST_DIR")
                .num_args(0..)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Append),
        )
        .arg(flag("serial", t!("cli.serial", locale = locale).to_string()))
        .arg(
            Arg::new("dim")
                .long("dim")
                .help(t!("cli.dim", locale = locale).to_string())
                .value_name("DIM")
                .value_parser(clap::value_parser!(u32))
                .action(ArgAction::Set),
        )
        .arg(flag("cmd", t!("cli.cmd", locale = locale).to_string()))
        .arg(
            Arg::new("sections")
                .long("sections")
                .help(t!("cli.sections", locale = locale).to_string())
                .value_name("SECTION")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(flag("debug", t!("cli.debug", locale = locale).to_string()))
        .arg(flag("profile", t!("cli.profile", locale = locale).to_string()))
        .arg(flag("coverage", t!("cli.coverage", locale = locale).to_string()))
        .arg(flag(
            "only-coverage",
            t!("cli.only_coverage", locale = locale).to_string(),
        ))
        .arg(flag(
            "no-coverage",
            t!("cli.no_coverage", locale = locale).to_string(),
        ))
        .arg(
            Arg::new("benchmark")
                .long("benchmark")
                .help(t!("cli.benchmark", locale = locale).to_string())
                .value_name("TAG")
                .action(ArgAction::Set),
        )
        .arg(flag("dryrun", t!("cli.dryrun", locale = locale).to_string()))
        .arg(
            Arg::new("comp")
                .long("comp")
                .help(t!("cli.comp", locale = locale).to_string())
                .value_name("COMPILER")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help(t!("cli.timeout", locale = locale).to_string())
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help(t!("cli.config", locale = locale).to_string())
                .value_name("CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("html")
                .long("html")
                .help(t!("cli.html", locale = locale).to_string())
                .value_name("HTML")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help(t!("cli.json", locale = locale).to_string())
                .value_name("JSON")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

/// Applies the parsed flags on top of the settings-file defaults.
fn suite_options(matches: &ArgMatches, settings: &SuiteSettings) -> SuiteOptions {
    let mut options = SuiteOptions::from_settings(settings);

    if let Some(tests) = matches.get_many::<PathBuf>("tests") {
        options.tests = tests.cloned().collect();
    }
    if let Some(sections) = matches.get_many::<String>("sections") {
        options.sections = Some(sections.cloned().collect());
    }
    options.dim = matches.get_one::<u32>("dim").copied();
    options.serial = matches.get_flag("serial");
    options.echo_commands = matches.get_flag("cmd");
    options.debug = matches.get_flag("debug");
    options.profile = matches.get_flag("profile");
    options.coverage = matches.get_flag("coverage");
    options.only_coverage = matches.get_flag("only-coverage");
    options.no_coverage = matches.get_flag("no-coverage");
    options.dry_run = matches.get_flag("dryrun");
    if let Some(tag) = matches.get_one::<String>("benchmark") {
        options.benchmark_tag = tag.clone();
    }
    if let Some(compiler) = matches.get_one::<String>("comp") {
        options.compiler = compiler.clone();
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        options.default_timeout = Duration::from_secs(*seconds);
    }

    options
}

pub async fn run() -> Result<ExitCode> {
    let settings_path = pre_parse_value("config").map(PathBuf::from);
    let settings = SuiteSettings::load(settings_path.as_deref())?;

    // --lang wins over the settings file, which wins over the system locale.
    match pre_parse_value("lang").or_else(|| settings.language.clone()) {
        Some(language) => crate::set_language(&language),
        None => crate::init(),
    }
    let locale = rust_i18n::locale().to_string();

    let matches = build_cli(&locale).get_matches();
    let options = suite_options(&matches, &settings);
    let reports = ReportTargets {
        html: matches.get_one::<PathBuf>("html").cloned(),
        json: matches.get_one::<PathBuf>("json").cloned(),
    };

    commands::run::execute(options, reports).await
}
