//! # Case Resolution Module / 用例解析模块
//!
//! Turns one configuration section into a [`CaseSpec`] and then, against the
//! suite options, into a concrete [`CasePlan`]: a command line ready to run, a
//! deliberate exclusion, or a soft skip because the binary is missing.
//!
//! Recognized keys: `cmd`, `dim`, `nprocs`, `args`, `ignore`, `check`,
//! `check-file`, `coverage`, `timeout` and `benchmark-<tag>`.
//!
//! 将一个配置节转换为 [`CaseSpec`]，再结合套件选项转换为具体的 [`CasePlan`]：
//! 可直接运行的命令行、有意的排除，或因可执行文件缺失而产生的软跳过。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::{BoolLike, ConfigError, Section, canonicalize_bool};
use crate::core::models::RunId;
use crate::core::planner::SuiteOptions;
use crate::infra::command::{display_command, split_words};

const BENCHMARK_PREFIX: &str = "benchmark-";

/// Whether a case asks for the coverage build of the binary.
/// 用例是否要求使用覆盖率版本的可执行文件。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Coverage {
    /// Follow the suite-wide `--coverage` switch.
    #[default]
    Inherit,
    ForceOn,
    ForceOff,
}

/// The declarative description of one case, as written in the input file.
/// 输入文件中所写的单个用例的声明式描述。
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSpec {
    pub name: String,
    pub dim: u32,
    pub nprocs: u32,
    /// Extra arguments with newlines normalized to spaces.
    pub args: String,
    pub check: bool,
    pub coverage: Coverage,
    /// Per-case timeout in seconds; overrides the suite default.
    pub timeout: Option<u64>,
    /// Literal command that replaces all command construction.
    pub command: Option<String>,
    /// Reference wall-clock seconds per environment tag.
    pub benchmarks: BTreeMap<String, f64>,
    pub ignore: Option<String>,
    pub check_file: Option<String>,
}

impl CaseSpec {
    /// A case with every key at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dim: 3,
            nprocs: 1,
            args: String::new(),
            check: true,
            coverage: Coverage::Inherit,
            timeout: None,
            command: None,
            benchmarks: BTreeMap::new(),
            ignore: None,
            check_file: None,
        }
    }

    /// Reads and validates the keys of one section.
    ///
    /// # Errors
    /// - `cmd` together with any other key
    /// - a `check`/`coverage` value that is not boolean-like
    /// - a non-numeric `dim`, `nprocs`, `timeout` or `benchmark-<tag>`
    ///
    /// 读取并校验一个节中的键。
    pub fn from_section(section: &Section) -> Result<Self, ConfigError> {
        let mut spec = Self::new(&section.name);

        if let Some(command) = section.get("cmd") {
            if section.len() > 1 {
                return Err(ConfigError::CommandWithOtherKeys {
                    section: section.name.clone(),
                    keys: section.keys().collect::<Vec<_>>().join(","),
                });
            }
            spec.command = Some(command.to_string());
            return Ok(spec);
        }

        if let Some(value) = section.get("check") {
            spec.check = parse_flag(section, "check", value)?;
        }
        if let Some(value) = section.get("coverage") {
            spec.coverage = if parse_flag(section, "coverage", value)? {
                Coverage::ForceOn
            } else {
                Coverage::ForceOff
            };
        }
        if let Some(value) = section.get("timeout") {
            spec.timeout = Some(parse_integer(section, "timeout", value)?);
        }
        if let Some(value) = section.get("dim") {
            spec.dim = parse_integer(section, "dim", value)?;
        }
        if let Some(value) = section.get("nprocs") {
            spec.nprocs = parse_integer(section, "nprocs", value)?;
            if spec.nprocs == 0 {
                return Err(invalid_integer(section, "nprocs", value));
            }
        }
        if let Some(value) = section.get("args") {
            spec.args = value.replace('\n', " ");
        }
        if let Some(value) = section.get("ignore") {
            spec.ignore = Some(value.replace('\n', " "));
        }
        if let Some(value) = section.get("check-file") {
            spec.check_file = Some(value.to_string());
        }

        for key in section.keys() {
            let Some(tag) = key.strip_prefix(BENCHMARK_PREFIX) else {
                continue;
            };
            let value = section.get(key).unwrap_or_default();
            let seconds = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|s| s.is_finite() && *s > 0.0)
                .ok_or_else(|| ConfigError::InvalidNumber {
                    section: section.name.clone(),
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            spec.benchmarks.insert(tag.to_string(), seconds);
        }

        Ok(spec)
    }

    /// The reference time for `tag`, if this case declares one.
    pub fn benchmark_for(&self, tag: &str) -> Option<f64> {
        self.benchmarks.get(tag).copied()
    }
}

fn parse_flag(section: &Section, key: &str, value: &str) -> Result<bool, ConfigError> {
    match canonicalize_bool(value) {
        BoolLike::True => Ok(true),
        BoolLike::False => Ok(false),
        BoolLike::Invalid => Err(ConfigError::InvalidBoolean {
            section: section.name.clone(),
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_integer<T: std::str::FromStr>(
    section: &Section,
    key: &str,
    value: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid_integer(section, key, value))
}

fn invalid_integer(section: &Section, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidInteger {
        section: section.name.clone(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// A case that is ready to run.
/// 一个可以直接运行的用例。
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCase {
    pub name: String,
    /// Run identifier qualified with the case name.
    pub label: String,
    /// The full command line, for display.
    pub command_line: String,
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Where `stdout`/`stderr` are written.
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub check: bool,
    pub check_file: Option<String>,
    /// Reference seconds for the active benchmark tag.
    pub benchmark: Option<f64>,
}

/// Why a case was left out without being counted anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Coverage-only mode and the case does not use a coverage binary.
    CoverageOnly,
    /// Serial mode and the case needs more than one process.
    Serial,
    /// The suite is restricted to another dimension.
    Dimension,
}

/// What the suite should do with one case.
#[derive(Debug, Clone, PartialEq)]
pub enum CasePlan {
    Run(PlannedCase),
    Excluded { name: String, reason: Exclusion },
    /// Counted as skipped: the binary this case needs has not been built.
    MissingBinary { name: String, binary: PathBuf },
}

/// Path of the simulation binary for a dimension and the active build variant.
///
/// Suffixes are appended in a fixed order: dimension, `-debug`, `-profile`,
/// `-coverage`, then the compiler tag, e.g. `./bin/alamo-2d-debug-g++`.
///
/// 给定维度和当前构建变体的仿真可执行文件路径。
/// 后缀按固定顺序追加：维度、`-debug`、`-profile`、`-coverage`，最后是编译器标签。
pub fn binary_path(options: &SuiteOptions, dim: u32, coverage: bool) -> PathBuf {
    let mut name = format!("{}-{}d", options.binary_prefix, dim);
    if options.debug {
        name.push_str("-debug");
    }
    if options.profile {
        name.push_str("-profile");
    }
    if coverage {
        name.push_str("-coverage");
    }
    name.push('-');
    name.push_str(&options.compiler);
    PathBuf::from(name)
}

/// Resolves a case against the suite options.
///
/// # Arguments
/// * `spec` - The parsed case
/// * `options` - Suite-wide switches
/// * `test_dir` - The directory holding the input file
/// * `run_id` - Namespace for this invocation's output paths
///
/// # Errors
/// Fails only for a literal `cmd` that is blank.
///
/// 根据套件选项解析一个用例。
pub fn plan_case(
    spec: &CaseSpec,
    options: &SuiteOptions,
    test_dir: &Path,
    run_id: &RunId,
) -> Result<CasePlan, ConfigError> {
    let mut coverage = match spec.coverage {
        Coverage::Inherit => options.coverage,
        Coverage::ForceOn => true,
        Coverage::ForceOff => false,
    };
    if options.only_coverage && !coverage {
        return Ok(excluded(spec, Exclusion::CoverageOnly));
    }
    if options.no_coverage {
        coverage = false;
    }

    let label = run_id.case_label(&spec.name);
    let output_dir = test_dir.join(&label);
    let timeout = spec
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(options.default_timeout);
    let benchmark = spec.benchmark_for(&options.benchmark_tag);

    if let Some(command) = &spec.command {
        let argv = split_words(command).ok_or_else(|| ConfigError::MalformedCommand {
            section: spec.name.clone(),
            command: command.clone(),
            reason: "empty command".to_string(),
        })?;
        return Ok(CasePlan::Run(PlannedCase {
            name: spec.name.clone(),
            label,
            command_line: command.trim().to_string(),
            argv,
            output_dir,
            timeout,
            check: spec.check,
            check_file: spec.check_file.clone(),
            benchmark,
        }));
    }

    if spec.nprocs > 1 && options.serial {
        return Ok(excluded(spec, Exclusion::Serial));
    }
    if options.dim.is_some_and(|dim| dim != spec.dim) {
        return Ok(excluded(spec, Exclusion::Dimension));
    }

    let binary = binary_path(options, spec.dim, coverage);
    if !binary.is_file() {
        return Ok(CasePlan::MissingBinary {
            name: spec.name.clone(),
            binary,
        });
    }

    let mut argv = Vec::new();
    if spec.nprocs > 1 {
        argv.extend(options.launcher.split_whitespace().map(str::to_string));
        argv.push(spec.nprocs.to_string());
    }
    argv.push(binary.display().to_string());
    argv.push(test_dir.join(&options.input_file).display().to_string());
    argv.extend(spec.args.split_whitespace().map(str::to_string));
    argv.push(format!("plot_file={}", output_dir.display()));
    if let Some(ignore) = &spec.ignore {
        let ignore = format!("ignore={}", ignore.trim());
        argv.extend(ignore.split_whitespace().map(str::to_string));
    }
    let command_line = display_command(&argv);

    Ok(CasePlan::Run(PlannedCase {
        name: spec.name.clone(),
        label,
        command_line,
        argv,
        output_dir,
        timeout,
        check: spec.check,
        check_file: spec.check_file.clone(),
        benchmark,
    }))
}

fn excluded(spec: &CaseSpec, reason: Exclusion) -> CasePlan {
    CasePlan::Excluded {
        name: spec.name.clone(),
        reason,
    }
}
