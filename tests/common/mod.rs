// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

use sim_test_runner::core::planner::SuiteOptions;

/// A throwaway project: `bin/` for stand-in simulation binaries and
/// `tests/` for test directories.
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempdir().expect("Failed to create temporary directory");
        fs::create_dir_all(root.path().join("bin")).expect("Failed to create bin directory");
        fs::create_dir_all(root.path().join("tests")).expect("Failed to create tests directory");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn tests_root(&self) -> PathBuf {
        self.path().join("tests")
    }

    pub fn binary_prefix(&self) -> String {
        self.path().join("bin").join("alamo").display().to_string()
    }

    /// Installs `./bin/alamo-<dim>d-g++` with the given shell body.
    pub fn add_binary(&self, dim: u32, body: &str) -> PathBuf {
        let path = PathBuf::from(format!("{}-{}d-g++", self.binary_prefix(), dim));
        write_script(&path, body);
        path
    }

    /// Creates `tests/<name>/input` holding `config` as `#@` lines among ordinary input.
    pub fn add_test(&self, name: &str, config: &str) -> PathBuf {
        let dir = self.tests_root().join(name);
        fs::create_dir_all(&dir).expect("Failed to create test directory");
        let mut input = String::from("# simulation input\namr.max_level = 2\n");
        for line in config.lines() {
            input.push_str("#@ ");
            input.push_str(line);
            input.push('\n');
        }
        input.push_str("timestep = 0.1\n");
        fs::write(dir.join("input"), input).expect("Failed to write input");
        dir
    }

    /// Installs the directory's `test` checker.
    pub fn add_checker(&self, test_dir: &Path, body: &str) -> PathBuf {
        let path = test_dir.join("test");
        write_script(&path, body);
        path
    }

    /// Suite options pointing at this workspace, with a short default timeout.
    pub fn options(&self) -> SuiteOptions {
        SuiteOptions {
            tests_root: self.tests_root(),
            binary_prefix: self.binary_prefix(),
            benchmark_tag: "ci".to_string(),
            default_timeout: Duration::from_secs(20),
            ..SuiteOptions::default()
        }
    }

    /// A `runtests.toml` for CLI runs in this workspace.
    pub fn write_settings(&self) -> PathBuf {
        let path = self.path().join("runtests.toml");
        let content = format!(
            "language = \"en\"\ntests_root = \"{}\"\nbinary_prefix = \"{}\"\ntimeout = 20\n",
            self.tests_root().display(),
            self.binary_prefix()
        );
        fs::write(&path, content).expect("Failed to write settings");
        path
    }
}

/// Writes an executable `/bin/sh` script.
pub fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
    }
}

/// Whether `pid` is still a live (non-zombie) process.
pub fn process_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

/// Case output directories created under `test_dir`, sorted.
pub fn output_dirs(test_dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(test_dir)
        .expect("Failed to list test directory")
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("output_"))
        })
        .collect();
    dirs.sort();
    dirs
}
