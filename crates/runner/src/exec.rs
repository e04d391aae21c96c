// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Process execution primitives: spawning, capped output capture, and the
//! termination ladder.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use volley_core::CommandSpec;

/// Default byte cap applied to each captured stream.
pub(crate) const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Default time between the termination signal and the forced kill.
pub(crate) const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// After a kill, how long the drains may wait for held-open pipes to
/// close before they are cut off.
pub(crate) const DRAIN_GRACE: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Spawn the child for `spec` with piped stdio.
///
/// On Unix the child gets its own process group so the termination ladder
/// takes down grandchildren the command spawns.
pub(crate) fn spawn(spec: &CommandSpec) -> std::io::Result<Child> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.cwd {
        command.current_dir(dir);
    }
    for (key, value) in &spec.env {
        command.env(key, value);
    }
    #[cfg(unix)]
    command.process_group(0);
    command.spawn()
}

/// Classification of a natural exit status.
pub(crate) enum ExitKind {
    Code(i32),
    /// Killed by a signal the runner did not send.
    Signalled(i32),
}

pub(crate) fn classify_exit(status: std::process::ExitStatus) -> ExitKind {
    if let Some(code) = status.code() {
        return ExitKind::Code(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitKind::Signalled(signal);
        }
    }
    ExitKind::Code(-1)
}

// ---------------------------------------------------------------------------
// Output capture
// ---------------------------------------------------------------------------

/// Rolling capture of one output stream, keeping at most `cap` bytes of
/// tail.
///
/// The buffer is allowed to grow to twice the cap before it is cut back,
/// so steady streams don't reallocate on every chunk. Cuts land on UTF-8
/// sequence starts, never inside a multi-byte character.
#[derive(Debug)]
pub(crate) struct Capture {
    buf: Vec<u8>,
    cap: usize,
    truncated: bool,
}

impl Capture {
    pub(crate) fn new(cap: usize) -> Self {
        Self { buf: Vec::new(), cap, truncated: false }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > self.cap.saturating_mul(2) {
            self.cut_to_cap();
        }
    }

    fn cut_to_cap(&mut self) {
        if self.buf.len() <= self.cap {
            return;
        }
        let mut cut = self.buf.len() - self.cap;
        // Continuation bytes are 0b10xxxxxx; advance to the next sequence start.
        while cut < self.buf.len() && (self.buf[cut] & 0b1100_0000) == 0b1000_0000 {
            cut += 1;
        }
        self.buf.drain(..cut);
        self.truncated = true;
    }

    /// Finish the capture: enforce the cap exactly and convert to text.
    /// Returns the text and whether anything was dropped.
    pub(crate) fn finish(mut self) -> (String, bool) {
        self.cut_to_cap();
        let truncated = self.truncated;
        match String::from_utf8(self.buf) {
            Ok(text) => (text, truncated),
            Err(err) => (String::from_utf8_lossy(err.as_bytes()).into_owned(), truncated),
        }
    }
}

/// Drain a stream into a capped capture; returns at EOF (pipe close), which
/// normally follows any kill path.
///
/// `stop` cuts the drain off when something outside the process group
/// still holds the pipe open; a cut-off capture is marked truncated since
/// the stream may have had more to say.
pub(crate) async fn drain<R>(mut stream: R, cap: usize, stop: CancellationToken) -> Capture
where
    R: AsyncRead + Unpin,
{
    let mut capture = Capture::new(cap);
    let mut chunk = [0u8; 8192];
    loop {
        tokio::select! {
            read = stream.read(&mut chunk) => match read {
                Ok(0) | Err(_) => break,
                Ok(n) => capture.push(&chunk[..n]),
            },
            _ = stop.cancelled() => {
                capture.truncated = true;
                break;
            }
        }
    }
    capture
}

// ---------------------------------------------------------------------------
// Termination ladder
// ---------------------------------------------------------------------------

/// How the termination ladder ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KillOutcome {
    /// Exited within the grace period after the termination signal.
    Graceful,
    /// Needed a forced kill after the grace period lapsed.
    Forced,
}

/// Terminate `child`: SIGTERM its process group, wait up to `grace`, then
/// SIGKILL. The child is always reaped before returning.
#[cfg(unix)]
pub(crate) async fn terminate(child: &mut Child, grace: Duration) -> KillOutcome {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        // Already exited and reaped.
        let _ = child.wait().await;
        return KillOutcome::Graceful;
    };
    let pgid = Pid::from_raw(pid as i32);

    if killpg(pgid, Signal::SIGTERM).is_err() {
        // Group already gone; just reap.
        let _ = child.wait().await;
        return KillOutcome::Graceful;
    }

    tokio::select! {
        _ = child.wait() => KillOutcome::Graceful,
        _ = tokio::time::sleep(grace) => {
            let _ = killpg(pgid, Signal::SIGKILL);
            let _ = child.wait().await;
            KillOutcome::Forced
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn terminate(child: &mut Child, _grace: Duration) -> KillOutcome {
    let _ = child.kill().await;
    KillOutcome::Forced
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
