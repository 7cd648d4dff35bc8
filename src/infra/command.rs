//! # Command Execution Module / 命令执行模块
//!
//! Spawns child processes with fully buffered stdout/stderr capture and an
//! optional wall-clock limit. Every child is started as the leader of its own
//! process group so that a timeout can take down launcher descendants
//! (e.g. the ranks started by `mpirun`) together with the direct child.
//!
//! 派生子进程，完整缓冲其 stdout/stderr，并支持可选的挂钟时间限制。
//! 每个子进程都作为自己进程组的组长启动，因此超时可以连同直接子进程一起
//! 终止启动器派生的后代进程（例如 `mpirun` 启动的各个进程）。

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::infra::t;

/// How long the output readers may keep draining after the child exited normally.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How long the output readers may keep draining after the child was killed.
const KILL_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// ESC followed by either a simple escape or a CSI sequence.
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ANSI escape pattern is valid")
});

/// The raw result of running a child process.
///
/// `status` is `None` when the child was killed because it exceeded its time limit.
///
/// 运行子进程的原始结果。
/// 当子进程因超出时间限制而被终止时，`status` 为 `None`。
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: Option<ExitStatus>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Wall-clock time measured around the spawn/wait boundary.
    /// 围绕派生/等待边界测得的挂钟时间。
    pub elapsed: Duration,
}

impl CapturedOutput {
    pub fn timed_out(&self) -> bool {
        self.status.is_none()
    }
}

/// Raised when captured output contains bytes outside the ASCII range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stream is not ASCII: byte 0x{byte:02x} at offset {offset}")]
pub struct OutputDecodeError {
    pub byte: u8,
    pub offset: usize,
}

/// Spawns a command and captures its stdout and stderr as raw bytes.
/// Both streams are read concurrently into shared buffers so that partial
/// output survives a timeout.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
/// * `timeout` - Optional wall-clock limit. On expiry the whole process group is killed.
///
/// # Returns
/// The exit status (absent on timeout), both streams and the elapsed time, or the
/// I/O error raised while spawning or waiting.
///
/// 派生一个命令并以原始字节捕获其 stdout 和 stderr。
/// 两个流被并发读取到共享缓冲区中，因此超时后仍保留已产生的部分输出。
///
/// # Arguments
/// * `cmd` - 要执行的 `tokio::process::Command`。
/// * `timeout` - 可选的挂钟时间限制。超时后整个进程组将被终止。
///
/// # Returns
/// 退出状态（超时时不存在）、两个输出流及耗时，或在派生/等待时产生的 I/O 错误。
pub async fn spawn_and_capture(
    mut cmd: Command,
    timeout: Option<Duration>,
) -> std::io::Result<CapturedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Lead a fresh process group so a timeout can signal every descendant at once.
    // 成为新进程组的组长，以便超时时可以一次性向所有后代进程发送信号。
    #[cfg(unix)]
    cmd.process_group(0);

    let start_time = Instant::now();
    let mut child = cmd.spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other(t!("command.capture_stdout_failed").to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other(t!("command.capture_stderr_failed").to_string()))?;

    let stdout_buf = Arc::new(Mutex::new(Vec::new()));
    let stderr_buf = Arc::new(Mutex::new(Vec::new()));
    let stdout_handle = tokio::spawn(drain_into(stdout, Arc::clone(&stdout_buf)));
    let stderr_handle = tokio::spawn(drain_into(stderr, Arc::clone(&stderr_buf)));

    let waited = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
        None => Some(child.wait().await),
    };

    let status = match waited {
        Some(status) => Some(status?),
        None => {
            kill_process_tree(&mut child).await?;
            None
        }
    };
    let elapsed = start_time.elapsed();

    // A grandchild that inherited the pipes may keep them open; bound the drain.
    // 继承了管道的孙进程可能使其保持打开；因此限制读取的等待时间。
    let grace = if status.is_some() {
        DRAIN_GRACE
    } else {
        KILL_DRAIN_GRACE
    };
    for handle in [stdout_handle, stderr_handle] {
        let abort = handle.abort_handle();
        if tokio::time::timeout(grace, handle).await.is_err() {
            abort.abort();
        }
    }

    let stdout = std::mem::take(&mut *stdout_buf.lock().await);
    let stderr = std::mem::take(&mut *stderr_buf.lock().await);

    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
        elapsed,
    })
}

async fn drain_into<R>(mut reader: R, sink: Arc<Mutex<Vec<u8>>>)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => sink.lock().await.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Kills the child and, on Unix, every process in the group it leads, then reaps it.
/// 终止子进程（在 Unix 上还包括其领导的进程组中的所有进程），然后回收它。
async fn kill_process_tree(child: &mut Child) -> std::io::Result<()> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: kill(2) with a negative pid only sends a signal; it touches no memory.
        unsafe {
            libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
        }
    }
    // The group kill may already have reaped the direct child's exit; ignore that race.
    let _ = child.start_kill();
    child.wait().await?;
    Ok(())
}

/// Decodes a captured stream with a strict ASCII policy.
/// Any byte above 0x7f is an error rather than being replaced.
///
/// 以严格的 ASCII 策略解码捕获的输出流。
/// 任何大于 0x7f 的字节都视为错误，而不是被替换。
pub fn decode_ascii(bytes: &[u8]) -> Result<String, OutputDecodeError> {
    if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(OutputDecodeError {
            byte: bytes[offset],
            offset,
        });
    }
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Removes ANSI color and control escape sequences from `text`.
/// 从 `text` 中移除 ANSI 颜色和控制转义序列。
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Splits a command on whitespace into program and arguments.
/// Quotes, `$` and `~` are ordinary characters. Returns `None` for a blank line.
///
/// 按空白字符将命令拆分为程序和参数。引号、`$` 和 `~` 均视为普通字符。
/// 如果命令行为空，则返回 `None`。
pub fn split_words(line: &str) -> Option<Vec<String>> {
    let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    (!words.is_empty()).then_some(words)
}

/// Joins `argv` for display, quoting only the arguments that contain
/// whitespace, quotes or backslashes.
pub fn display_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\'))
            {
                shlex::try_quote(arg).unwrap_or(Cow::Borrowed(arg.as_str()))
            } else {
                Cow::Borrowed(arg.as_str())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
