use crate::error::RunnerError;
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::{CommandSpec, ProcessOutput, ProcessRunner};

// ============================================================================
// NativeRunner - deadline-bounded native process execution
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// The child is awaited on a helper thread while the caller blocks on a channel
/// with `recv_timeout`. When the deadline expires the child is sent `SIGKILL`
/// (its whole process group when [`NativeRunner::new`] is used), the helper thread
/// drains the closed pipes, and the flushed output is returned with
/// `timed_out = true`.
///
/// # Process groups
///
/// [`NativeRunner::new`] starts every child in a fresh process group so that a
/// worker and the solver processes it spawned die together.
/// [`NativeRunner::inheriting_group`] keeps children in the caller's group; a
/// worker uses it for its own solver calls so the parent's group kill reaches them.
///
/// # Example
///
/// ```rust,no_run
/// use seedsearch_runner::{CommandSpec, NativeRunner, ProcessRunner};
/// use std::time::Duration;
///
/// let runner = NativeRunner::new();
/// let cmd = CommandSpec::new("clingo").args(["--version"]);
/// let output = runner.run(&cmd, Duration::from_secs(30)).unwrap();
/// assert!(output.success());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NativeRunner {
    new_process_group: bool,
}

impl Default for NativeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRunner {
    /// Runner that isolates each child in its own process group.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            new_process_group: true,
        }
    }

    /// Runner whose children stay in the caller's process group.
    #[must_use]
    pub const fn inheriting_group() -> Self {
        Self {
            new_process_group: false,
        }
    }

    /// Whether children are placed in a fresh process group.
    #[must_use]
    pub const fn isolates_group(&self) -> bool {
        self.new_process_group
    }
}

impl ProcessRunner for NativeRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        if cmd.program.is_empty() {
            return Err(RunnerError::ConfigurationInvalid {
                reason: "empty program name".to_string(),
            });
        }

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        if self.new_process_group {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: cmd.program.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;

        let child_id = child.id();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let output = child.wait_with_output();
            let _ = tx.send(output);
        });

        let received = if timeout == Duration::MAX {
            rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected)
        } else {
            rx.recv_timeout(timeout)
        };

        match received {
            Ok(output_result) => {
                let _ = handle.join();
                let output = output_result.map_err(|e| RunnerError::NativeExecutionFailed {
                    reason: format!("Failed to wait for process: {e}"),
                })?;
                Ok(ProcessOutput::new(
                    output.stdout,
                    output.stderr,
                    output.status.code(),
                    false,
                ))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    program = %cmd.program.to_string_lossy(),
                    timeout_secs = timeout.as_secs(),
                    "Deadline expired, killing process"
                );
                self.terminate_process(child_id);

                // Pipes close once the child is gone; the helper thread then
                // delivers whatever was flushed.
                let _ = handle.join();
                let (stdout, stderr) = match rx.try_recv() {
                    Ok(Ok(output)) => (output.stdout, output.stderr),
                    _ => (Vec::new(), Vec::new()),
                };
                Ok(ProcessOutput::new(stdout, stderr, None, true))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunnerError::NativeExecutionFailed {
                reason: "Process monitoring thread terminated unexpectedly".to_string(),
            }),
        }
    }
}

impl NativeRunner {
    /// Kill a process, or its whole group when it was started in one.
    fn terminate_process(&self, pid: u32) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, kill, killpg};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(pid as i32);
            let result = if self.new_process_group {
                killpg(pid, Signal::SIGKILL)
            } else {
                kill(pid, Signal::SIGKILL)
            };
            if let Err(err) = result {
                tracing::debug!(error = %err, "Kill signal not delivered");
            }
        }

        #[cfg(windows)]
        {
            use windows::Win32::Foundation::CloseHandle;
            use windows::Win32::System::Threading::{
                OpenProcess, PROCESS_TERMINATE, TerminateProcess,
            };

            unsafe {
                if let Ok(handle) = OpenProcess(PROCESS_TERMINATE, false, pid) {
                    let _ = TerminateProcess(handle, 1);
                    let _ = CloseHandle(handle);
                }
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = pid;
        }
    }
}
