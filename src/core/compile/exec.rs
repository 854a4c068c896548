//! Subprocess execution with a hard deadline.
//!
//! The engine can produce large volumes of output, so both pipes are
//! drained on threads while the parent polls `try_wait`; a full pipe
//! buffer must never block the child. On deadline the child is killed and
//! reaped.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::warn;

/// Poll interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of one bounded subprocess run.
#[derive(Debug)]
pub enum ExecOutcome {
    /// The child exited within the deadline.
    Completed {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    /// The deadline passed and the child was killed.
    TimedOut,
    /// The executable could not be found.
    MissingExecutable,
    /// Spawning or waiting failed for another reason.
    Failed(String),
}

/// Run `command` to completion, enforcing `timeout`.
///
/// Captured output is converted lossily to UTF-8.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> ExecOutcome {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ExecOutcome::MissingExecutable;
        }
        Err(err) => return ExecOutcome::Failed(err.to_string()),
    };

    let stdout = spawn_drain(child.stdout.take());
    let stderr = spawn_drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return ExecOutcome::Completed {
                    status,
                    stdout: join_drain(stdout),
                    stderr: join_drain(stderr),
                };
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    kill_and_reap(&mut child);
                    // Killing the child closes the pipes, so the drains
                    // finish on their own.
                    let _ = join_drain(stdout);
                    let _ = join_drain(stderr);
                    return ExecOutcome::TimedOut;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                kill_and_reap(&mut child);
                let _ = join_drain(stdout);
                let _ = join_drain(stderr);
                return ExecOutcome::Failed(err.to_string());
            }
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn join_drain(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

fn kill_and_reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        warn!(error = %err, "failed to kill timed-out process");
    }
    let _ = child.wait();
}
