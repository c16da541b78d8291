use crate::backends::lines::{ConsoleLine, LineSplitter};
use crate::constants::PROCESS_POLL_MILLIS;
use crate::error::{Result, UnipkgError};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Resolve a backend executable on PATH.
pub fn resolve_executable(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| UnipkgError::ExecutableMissing(name.to_string()))
}

/// How a streamed process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRun {
    /// `None` when killed by a signal or by cancellation
    pub exit_code: Option<i32>,
    /// Permanent lines only, newline-joined
    pub output: String,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn spawn_reader<R>(mut source: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match source.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send((stream, chunk[..n].to_vec())).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn spawn_piped(cmd: &mut Command) -> Result<(Child, Receiver<(Stream, Vec<u8>)>, Vec<JoinHandle<()>>)> {
    let cmd_debug = format!("{:?}", cmd);

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| UnipkgError::SystemCommandFailed {
        command: cmd_debug.clone(),
        reason: e.to_string(),
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| UnipkgError::SystemCommandFailed {
            command: cmd_debug.clone(),
            reason: "Failed to capture stdout".to_string(),
        })?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| UnipkgError::SystemCommandFailed {
            command: cmd_debug.clone(),
            reason: "Failed to capture stderr".to_string(),
        })?;

    let (tx, rx) = mpsc::channel();
    let readers = vec![
        spawn_reader(stdout, Stream::Stdout, tx.clone()),
        spawn_reader(stderr, Stream::Stderr, tx),
    ];
    Ok((child, rx, readers))
}

/// Splits each stream separately so stdout and stderr never interleave mid-line.
struct MergedLines {
    stdout: LineSplitter,
    stderr: LineSplitter,
    output: Vec<String>,
}

impl MergedLines {
    fn new() -> Self {
        Self {
            stdout: LineSplitter::new(),
            stderr: LineSplitter::new(),
            output: Vec::new(),
        }
    }

    fn feed(&mut self, stream: Stream, bytes: &[u8], on_line: &mut dyn FnMut(&ConsoleLine)) {
        let lines = match stream {
            Stream::Stdout => self.stdout.push(bytes),
            Stream::Stderr => self.stderr.push(bytes),
        };
        for line in lines {
            self.record(line, on_line);
        }
    }

    fn finish(&mut self, on_line: &mut dyn FnMut(&ConsoleLine)) {
        let rest: Vec<ConsoleLine> = [self.stdout.finish(), self.stderr.finish()]
            .into_iter()
            .flatten()
            .collect();
        for line in rest {
            self.record(line, on_line);
        }
    }

    fn record(&mut self, line: ConsoleLine, on_line: &mut dyn FnMut(&ConsoleLine)) {
        if line.is_newline {
            self.output.push(line.text.clone());
        }
        on_line(&line);
    }
}

/// Run a mutating command, pushing every line to `on_line` as it arrives.
///
/// The child is polled every few milliseconds; once `cancel` is set it is
/// killed and the run reports `cancelled`.
pub fn run_streaming(
    cmd: &mut Command,
    cancel: &AtomicBool,
    on_line: &mut dyn FnMut(&ConsoleLine),
) -> Result<ProcessRun> {
    let cmd_debug = format!("{:?}", cmd);
    let (mut child, rx, readers) = spawn_piped(cmd)?;
    let mut merged = MergedLines::new();
    let poll = Duration::from_millis(PROCESS_POLL_MILLIS);
    let mut cancelled = false;

    let status = loop {
        match rx.recv_timeout(poll) {
            Ok((stream, bytes)) => merged.feed(stream, &bytes, on_line),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => thread::sleep(poll),
        }

        if !cancelled && cancel.load(Ordering::SeqCst) {
            tracing::debug!(command = %cmd_debug, "cancel requested, killing child");
            let _ = child.kill();
            cancelled = true;
        }

        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                return Err(UnipkgError::SystemCommandFailed {
                    command: cmd_debug,
                    reason: e.to_string(),
                });
            }
        }
    };

    // Drain what the readers still hold; bounded in case a grandchild keeps the pipe open
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        match rx.recv_timeout(poll) {
            Ok((stream, bytes)) => merged.feed(stream, &bytes, on_line),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    merged.finish(on_line);
    for reader in readers {
        if reader.is_finished() {
            let _ = reader.join();
        }
    }

    Ok(ProcessRun {
        exit_code: if cancelled { None } else { status.code() },
        output: merged.output.join("\n"),
        cancelled,
    })
}

/// Run a listing command and return its merged, permissively decoded output.
///
/// Killed after `timeout`; a nonzero exit is not an error because several
/// backends exit nonzero while still printing usable tables.
pub fn run_listing(cmd: &mut Command, timeout: Duration) -> Result<String> {
    let cmd_debug = format!("{:?}", cmd);
    let (mut child, rx, readers) = spawn_piped(cmd)?;
    let mut merged = MergedLines::new();
    let mut ignore = |_: &ConsoleLine| {};
    let poll = Duration::from_millis(PROCESS_POLL_MILLIS);
    let start = Instant::now();

    loop {
        match rx.recv_timeout(poll) {
            Ok((stream, bytes)) => merged.feed(stream, &bytes, &mut ignore),
            Err(RecvTimeoutError::Disconnected) => {
                // Both pipes closed; the child is exiting
                let _ = child.wait();
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(UnipkgError::SystemCommandFailed {
                command: cmd_debug,
                reason: format!("Command timed out after {} seconds", timeout.as_secs()),
            });
        }
    }

    merged.finish(&mut ignore);
    for reader in readers {
        let _ = reader.join();
    }

    tracing::debug!(command = %cmd_debug, lines = merged.output.len(), "listing finished");
    Ok(merged.output.join("\n"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn test_streaming_merges_streams_and_reports_exit() {
        let mut seen = Vec::new();
        let cancel = AtomicBool::new(false);
        let run = run_streaming(
            &mut sh("echo one; echo two 1>&2; printf 'p1\\rp2\\r\\n'; exit 3"),
            &cancel,
            &mut |line: &ConsoleLine| seen.push(line.text.clone()),
        )
        .unwrap();

        assert_eq!(run.exit_code, Some(3));
        assert!(!run.cancelled);
        assert!(run.output.contains("one"));
        assert!(run.output.contains("two"));
        assert!(run.output.contains("p2"));
        assert!(!run.output.contains("p1"));
        assert!(seen.iter().any(|l| l == "p1"));
    }

    #[test]
    fn test_streaming_cancel_kills_child() {
        let cancel = AtomicBool::new(true);
        let started = Instant::now();
        let run = run_streaming(&mut sh("sleep 30"), &cancel, &mut |_: &ConsoleLine| {}).unwrap();
        assert!(run.cancelled);
        assert_eq!(run.exit_code, None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_listing_returns_output() {
        let out = run_listing(&mut sh("echo 'Name Id'; echo 'a b'"), Duration::from_secs(10)).unwrap();
        assert_eq!(out, "Name Id\na b");
    }

    #[test]
    fn test_listing_times_out() {
        let err = run_listing(&mut sh("sleep 30"), Duration::from_millis(200)).unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_missing_executable() {
        let err = resolve_executable("definitely-not-a-real-binary-xyz").unwrap_err();
        assert!(matches!(err, UnipkgError::ExecutableMissing(_)));
    }
}
