//! Subprocess runner for documentation builds.
//!
//! Bounded by a fixed timeout; a timed-out build is killed and reported as
//! a failure, never retried. Output is scanned for warning/error counts so
//! the CLI can summarize tool diagnostics without parsing them itself.

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

pub const BUILD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub warnings: usize,
    pub errors: usize,
}

/// Run `program args...` in `cwd` with a timeout.
///
/// Missing binary, timeout, and non-zero exit are all Build errors with
/// suggestions; success returns diagnostic counts from combined output.
pub fn run_build(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<BuildReport> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::build(
                    format!("{program} is not installed or not on PATH"),
                    format!("install {program} (e.g. via `uv tool install {program}`) and retry"),
                )
            } else {
                Error::io(cwd.to_path_buf(), e)
            }
        })?;

    // Drain pipes on threads so a chatty build can't fill the pipe buffer
    // and deadlock the poll loop.
    let stdout = child.stdout.take().map(read_to_string_thread);
    let stderr = child.stderr.take().map(read_to_string_thread);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait().map_err(|e| Error::io(cwd.to_path_buf(), e))? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::build(
                    format!("{program} timed out after {}s", timeout.as_secs()),
                    "the build was killed; inspect the docs project for pathological inputs",
                ));
            }
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    };

    let stdout = stdout.map(join_reader).unwrap_or_default();
    let stderr = stderr.map(join_reader).unwrap_or_default();
    let combined = format!("{stdout}\n{stderr}");

    if !status.success() {
        let detail = stderr
            .lines()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("no stderr output");
        return Err(Error::build(
            format!("{program} failed ({status}): {detail}"),
            format!("run `{program} {}` manually for the full log", args.join(" ")),
        ));
    }

    Ok(BuildReport {
        warnings: count_diagnostics(&combined, "warning"),
        errors: count_diagnostics(&combined, "error"),
    })
}

fn read_to_string_thread(
    mut reader: impl Read + Send + 'static,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = reader.read_to_string(&mut buf);
        buf
    })
}

fn join_reader(handle: std::thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Count output lines carrying a diagnostic marker, case-insensitively.
fn count_diagnostics(output: &str, marker: &str) -> usize {
    output
        .lines()
        .filter(|line| line.to_lowercase().contains(marker))
        .count()
}
