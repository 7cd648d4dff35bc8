//! # Command Module Unit Tests / Command 模块单元测试
//!
//! This module contains unit tests for process spawning, output capture,
//! timeouts and the decoding helpers in `infra::command`.
//!
//! 此模块包含 `infra::command` 中进程派生、输出捕获、超时以及解码辅助函数的单元测试。

mod common;

use std::time::Duration;
use tokio::process::Command;

use sim_test_runner::infra::command::{
    OutputDecodeError, decode_ascii, display_command, spawn_and_capture, split_words, strip_ansi,
};

mod decode_tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(decode_ascii(b"step 1\nstep 2\n").unwrap(), "step 1\nstep 2\n");
    }

    #[test]
    fn test_non_ascii_is_an_error() {
        let err = decode_ascii("ok\u{00e9}".as_bytes()).unwrap_err();
        assert_eq!(err, OutputDecodeError { byte: 0xc3, offset: 2 });
        assert!(err.to_string().contains("not ASCII"));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mFAIL\x1b[0m done"), "FAIL done");
        assert_eq!(strip_ansi("\x1b[1;32mPASS\x1b[0m"), "PASS");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_words_keeps_shell_characters() {
        assert_eq!(
            split_words("mpirun -np 2   ./bin/alamo-2d-g++\ttitle=don't"),
            Some(words(&["mpirun", "-np", "2", "./bin/alamo-2d-g++", "title=don't"]))
        );
        assert_eq!(
            split_words("sh -c echo_$UNSET_NAME>~/out 'x"),
            Some(words(&["sh", "-c", "echo_$UNSET_NAME>~/out", "'x"]))
        );
        assert_eq!(split_words("   "), None);
    }

    #[test]
    fn test_display_command_quotes_only_when_needed() {
        assert_eq!(
            display_command(&words(&["./bin/alamo-2d-g++", "input", "plot_file=out"])),
            "./bin/alamo-2d-g++ input plot_file=out"
        );
        let shown = display_command(&words(&["./run", "my input", "title=don't"]));
        assert!(shown.starts_with("./run "));
        assert!(!shown.contains(" my input "));
        assert_eq!(
            shlex::split(&shown),
            Some(words(&["./run", "my input", "title=don't"]))
        );
    }
}

#[cfg(unix)]
mod spawn_tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let out = spawn_and_capture(shell("echo out; echo err >&2"), None)
            .await
            .unwrap();
        assert!(out.status.unwrap().success());
        assert!(!out.timed_out());
        assert_eq!(out.stdout, b"out\n");
        assert_eq!(out.stderr, b"err\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let out = spawn_and_capture(shell("exit 3"), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        assert_eq!(out.status.and_then(|s| s.code()), Some(3));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_io_error() {
        let cmd = Command::new("/definitely/not/a/binary");
        assert!(spawn_and_capture(cmd, None).await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_keeps_partial_output() {
        let out = spawn_and_capture(
            shell("echo started; sleep 30"),
            Some(Duration::from_millis(500)),
        )
        .await
        .unwrap();
        assert!(out.timed_out());
        assert_eq!(out.stdout, b"started\n");
        assert!(out.elapsed < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_timeout_kills_descendants() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

        let out = spawn_and_capture(shell(&script), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(out.timed_out());

        let pid: u32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        // Give the kernel a moment to tear the process down.
        for _ in 0..50 {
            if !common::process_alive(pid) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!common::process_alive(pid), "grandchild {} survived the timeout", pid);
    }
}
