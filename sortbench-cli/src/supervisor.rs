//! Supervisor Process
//!
//! Spawns worker processes, hands them one job at a time and enforces the
//! per-job deadline. A worker that overruns is sent SIGTERM, given a short
//! grace window, then SIGKILLed and reaped before the next job starts.

use sortbench_ipc::{
    FailureKind, FrameError, FrameReader, FrameWriter, IPC_FD_ENV, JobRequest, PROTOCOL_VERSION,
    SupervisorCommand, WORKER_FLAG, WorkerCapabilities, WorkerMessage,
};
use std::env;
use std::os::unix::io::{FromRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Grace window between SIGTERM and SIGKILL
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// How long a freshly spawned worker has to send `Hello`
const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a single `poll(2)` wait, so worker death is noticed promptly
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Errors raised while driving a worker
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Worker could not be started
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// Frame could not be written or read
    #[error("IPC error: {0}")]
    IpcError(String),

    /// Worker died or hung up mid-job
    #[error("Worker crashed: {0}")]
    WorkerCrashed(String),

    /// Worker never completed the startup handshake
    #[error("Worker sent no Hello within {0:?}")]
    HandshakeTimeout(Duration),

    /// Job exceeded its deadline; the worker has been terminated
    #[error("Timeout waiting for worker")]
    Timeout,

    /// Worker sent something other than what the protocol allows
    #[error("Worker protocol error: expected {expected}, got {got}")]
    ProtocolError {
        /// Message the supervisor was waiting for
        expected: String,
        /// Message that arrived
        got: String,
    },
}

impl From<FrameError> for SupervisorError {
    fn from(e: FrameError) -> Self {
        SupervisorError::IpcError(e.to_string())
    }
}

/// What the worker reported for a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Sort finished
    Completed {
        /// Comparisons counted
        comparisons: u64,
        /// Movements counted
        movements: u64,
        /// Time spent inside the sort
        elapsed: Duration,
    },
    /// Worker caught an error and stayed alive
    Failed {
        /// Unknown method or panic
        kind: FailureKind,
        /// Diagnostic
        message: String,
    },
}

/// Result of polling for data
#[derive(Debug)]
enum PollResult {
    DataAvailable,
    Timeout,
    PipeClosed,
    Error(std::io::Error),
}

/// Wait for data to be available on a file descriptor with timeout
fn wait_for_data(fd: RawFd, timeout_ms: i32) -> PollResult {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    // SAFETY: `pollfd` is a valid, exclusively borrowed struct for the duration of the call
    let result = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };

    if result < 0 {
        PollResult::Error(std::io::Error::last_os_error())
    } else if result == 0 {
        PollResult::Timeout
    } else if pollfd.revents & libc::POLLIN != 0 {
        // Readable data takes priority over a hangup on the same fd
        PollResult::DataAvailable
    } else if pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
        PollResult::PipeClosed
    } else {
        PollResult::Timeout
    }
}

/// Create a close-on-exec pipe pair, returning (read_fd, write_fd).
fn create_pipe() -> Result<(RawFd, RawFd), std::io::Error> {
    let mut fds = [0 as RawFd; 2];
    // SAFETY: `fds` has room for the two descriptors pipe(2) writes
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    for &fd in &fds {
        // SAFETY: fd was just returned by pipe(2) and is owned here
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFD);
            libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
        }
    }
    Ok((fds[0], fds[1]))
}

fn close_fd(fd: RawFd) {
    // SAFETY: callers only pass descriptors they own and never use again
    unsafe {
        libc::close(fd);
    }
}

/// Send SIGTERM to a process. Returns `Err` if the signal could not be delivered.
fn send_sigterm(pid: u32) -> Result<(), std::io::Error> {
    // SAFETY: kill(2) has no memory-safety preconditions
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Arrange for the child to see `child_read` on fd 3 and `child_write` on fd 4.
///
/// Both pipes exist before the fork, so an original descriptor may already sit
/// on 3 or 4. The child ends are lifted to fds >= 10 first, every original is
/// closed, and only then are the copies moved into place.
fn attach_ipc_fds(
    command: &mut Command,
    child_read: RawFd,
    child_write: RawFd,
    parent_ends: [RawFd; 2],
) {
    // SAFETY: the closure only calls async-signal-safe libc functions
    unsafe {
        command.pre_exec(move || {
            let read_copy = libc::fcntl(child_read, libc::F_DUPFD, 10);
            if read_copy < 0 {
                return Err(std::io::Error::last_os_error());
            }
            let write_copy = libc::fcntl(child_write, libc::F_DUPFD, 10);
            if write_copy < 0 {
                return Err(std::io::Error::last_os_error());
            }

            for fd in [child_read, child_write, parent_ends[0], parent_ends[1]] {
                libc::close(fd);
            }

            // dup2 leaves FD_CLOEXEC clear on the target
            if libc::dup2(read_copy, 3) < 0 || libc::dup2(write_copy, 4) < 0 {
                return Err(std::io::Error::last_os_error());
            }
            libc::close(read_copy);
            libc::close(write_copy);

            Ok(())
        });
    }
}

fn millis(d: Duration) -> i32 {
    d.as_millis().min(i32::MAX as u128) as i32
}

/// Worker process handle
pub struct WorkerHandle {
    child: Child,
    reader: FrameReader<std::fs::File>,
    writer: FrameWriter<std::fs::File>,
    capabilities: Option<WorkerCapabilities>,
    timeout: Duration,
    msg_read_fd: RawFd,
}

impl WorkerHandle {
    /// Spawn a worker from the current executable, using fd 3/4 for IPC.
    pub fn spawn(timeout: Duration) -> Result<Self, SupervisorError> {
        let binary = env::current_exe().map_err(SupervisorError::SpawnFailed)?;
        Self::spawn_binary(&binary, timeout)
    }

    /// Spawn a worker from a specific binary that understands `--sort-worker`.
    pub fn spawn_binary(binary: impl AsRef<Path>, timeout: Duration) -> Result<Self, SupervisorError> {
        let mut command = Command::new(binary.as_ref());
        command.arg(WORKER_FLAG);
        Self::spawn_command(command, timeout, HELLO_TIMEOUT)
    }

    fn spawn_command(
        mut command: Command,
        timeout: Duration,
        hello_timeout: Duration,
    ) -> Result<Self, SupervisorError> {
        // cmd_pipe: supervisor writes commands, worker reads from fd 3
        let (cmd_read, cmd_write) = create_pipe()?;
        // msg_pipe: worker writes messages to fd 4, supervisor reads
        let (msg_read, msg_write) = match create_pipe() {
            Ok(fds) => fds,
            Err(e) => {
                close_fd(cmd_read);
                close_fd(cmd_write);
                return Err(SupervisorError::SpawnFailed(e));
            }
        };

        command
            .env(IPC_FD_ENV, "3,4")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        attach_ipc_fds(&mut command, cmd_read, msg_write, [cmd_write, msg_read]);

        let child = match command.spawn() {
            Ok(c) => c,
            Err(e) => {
                close_fd(cmd_read);
                close_fd(cmd_write);
                close_fd(msg_read);
                close_fd(msg_write);
                return Err(SupervisorError::SpawnFailed(e));
            }
        };

        // Child-side ends belong to the worker now
        close_fd(cmd_read);
        close_fd(msg_write);

        // SAFETY: both fds came from pipe(2) above and are owned by nothing else
        let writer_file = unsafe { std::fs::File::from_raw_fd(cmd_write) };
        let reader_file = unsafe { std::fs::File::from_raw_fd(msg_read) };

        let mut handle = Self {
            child,
            reader: FrameReader::new(reader_file),
            writer: FrameWriter::new(writer_file),
            capabilities: None,
            timeout,
            msg_read_fd: msg_read,
        };

        handle.wait_for_hello(hello_timeout)?;
        tracing::debug!(pid = handle.pid(), "worker ready");
        Ok(handle)
    }

    /// Wait for Hello message from worker and validate protocol version.
    ///
    /// A worker that stays silent past `hello_timeout` is dropped, which
    /// terminates it.
    fn wait_for_hello(&mut self, hello_timeout: Duration) -> Result<(), SupervisorError> {
        let start = Instant::now();
        while !self.reader.has_buffered_data() {
            let remaining = hello_timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(SupervisorError::HandshakeTimeout(hello_timeout));
            }
            match wait_for_data(self.msg_read_fd, millis(remaining.min(POLL_SLICE))) {
                PollResult::DataAvailable => break,
                PollResult::Timeout => {
                    if !self.is_alive() {
                        return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                    }
                }
                PollResult::PipeClosed => {
                    return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                }
                PollResult::Error(e) => {
                    return Err(SupervisorError::WorkerCrashed(format!("Pipe error: {}", e)));
                }
            }
        }

        let msg: WorkerMessage = self.reader.read()?;

        match msg {
            WorkerMessage::Hello(caps) => {
                if caps.protocol_version != PROTOCOL_VERSION {
                    return Err(SupervisorError::ProtocolError {
                        expected: format!("protocol version {}", PROTOCOL_VERSION),
                        got: format!("protocol version {}", caps.protocol_version),
                    });
                }
                self.capabilities = Some(caps);
                Ok(())
            }
            other => Err(SupervisorError::ProtocolError {
                expected: "Hello".to_string(),
                got: format!("{:?}", other),
            }),
        }
    }

    /// Get worker capabilities
    pub fn capabilities(&self) -> Option<&WorkerCapabilities> {
        self.capabilities.as_ref()
    }

    /// OS process id of the worker
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Send `job` and wait for its result, at most the configured timeout.
    ///
    /// On `Err(Timeout)` the worker has already been terminated and reaped.
    pub fn run_job(&mut self, job: JobRequest) -> Result<WorkerOutcome, SupervisorError> {
        let job_id = job.job_id;
        self.writer.write(&SupervisorCommand::Run(job))?;

        let start = Instant::now();

        loop {
            let remaining = self.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return self.handle_timeout();
            }

            // A buffered partial frame may never complete if the worker died
            if self.reader.has_buffered_data() {
                if !self.is_alive() {
                    return Err(SupervisorError::WorkerCrashed(
                        "Worker process crashed with partial data buffered".to_string(),
                    ));
                }
            } else {
                match wait_for_data(self.msg_read_fd, millis(remaining.min(POLL_SLICE))) {
                    PollResult::DataAvailable => {}
                    PollResult::Timeout => {
                        if !self.is_alive() {
                            return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                        }
                        continue;
                    }
                    PollResult::PipeClosed => {
                        return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                    }
                    PollResult::Error(e) => {
                        return Err(SupervisorError::WorkerCrashed(format!("Pipe error: {}", e)));
                    }
                }
            }

            let msg: WorkerMessage = match self.reader.read() {
                Ok(msg) => msg,
                Err(FrameError::EndOfStream) => {
                    return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                }
                Err(e) => {
                    if !self.is_alive() {
                        return Err(SupervisorError::WorkerCrashed(
                            "Worker crashed during read".to_string(),
                        ));
                    }
                    return Err(SupervisorError::IpcError(e.to_string()));
                }
            };

            return match msg {
                WorkerMessage::Complete {
                    job_id: reply_id,
                    comparisons,
                    movements,
                    duration_nanos,
                } if reply_id == job_id => Ok(WorkerOutcome::Completed {
                    comparisons,
                    movements,
                    elapsed: Duration::from_nanos(duration_nanos),
                }),
                WorkerMessage::Failure {
                    job_id: reply_id,
                    kind,
                    message,
                    backtrace,
                } if reply_id == job_id => {
                    if let Some(backtrace) = backtrace {
                        tracing::debug!("worker backtrace:\n{}", backtrace);
                    }
                    Ok(WorkerOutcome::Failed { kind, message })
                }
                other => Err(SupervisorError::ProtocolError {
                    expected: format!("Complete/Failure for job {}", job_id),
                    got: format!("{:?}", other),
                }),
            };
        }
    }

    /// Terminate an overrunning worker: SIGTERM, up to 500ms grace, then SIGKILL.
    fn handle_timeout(&mut self) -> Result<WorkerOutcome, SupervisorError> {
        let pid = self.pid();
        tracing::debug!(pid, "worker exceeded deadline, terminating");

        // Worker may already be gone
        let _ = send_sigterm(pid);

        let grace_deadline = Instant::now() + TERMINATE_GRACE;
        while self.is_alive() {
            let remaining = grace_deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(Duration::from_millis(10)));
        }

        if self.is_alive() {
            tracing::debug!(pid, "worker ignored SIGTERM, killing");
            let _ = self.child.kill();
        }
        let _ = self.child.wait();

        Err(SupervisorError::Timeout)
    }

    fn exit_description(&mut self) -> String {
        match self.child.try_wait() {
            Ok(Some(status)) => format!("Worker exited unexpectedly ({})", status),
            _ => "Worker closed connection unexpectedly".to_string(),
        }
    }

    /// Shutdown the worker gracefully
    pub fn shutdown(mut self) -> Result<(), SupervisorError> {
        self.writer.write(&SupervisorCommand::Shutdown)?;
        let _ = self.child.wait();
        Ok(())
    }

    /// Check if worker process is still running
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the worker process forcefully
    pub fn kill(&mut self) -> Result<(), SupervisorError> {
        self.child.kill().map_err(SupervisorError::SpawnFailed)?;
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.is_alive() {
            let _ = send_sigterm(self.child.id());
            std::thread::sleep(Duration::from_millis(50));
            if self.is_alive() {
                let _ = self.child.kill();
            }
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_pipe_poll_reports_data_and_hangup() {
        let (read_fd, write_fd) = create_pipe().unwrap();
        let mut writer = unsafe { std::fs::File::from_raw_fd(write_fd) };
        let mut reader = unsafe { std::fs::File::from_raw_fd(read_fd) };

        assert!(matches!(wait_for_data(read_fd, 0), PollResult::Timeout));

        writer.write_all(b"x").unwrap();
        assert!(matches!(wait_for_data(read_fd, 100), PollResult::DataAvailable));
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte).unwrap();

        drop(writer);
        assert!(matches!(wait_for_data(read_fd, 100), PollResult::PipeClosed));
    }

    #[test]
    fn test_spawn_missing_binary_fails() {
        let result = WorkerHandle::spawn_binary("/nonexistent/sortbench", Duration::from_secs(1));
        assert!(matches!(result, Err(SupervisorError::SpawnFailed(_))));
    }

    #[test]
    fn test_spawn_non_worker_binary_fails_handshake() {
        // `true` exits immediately without saying Hello
        let result = WorkerHandle::spawn_binary("true", Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_silent_worker_hits_handshake_deadline() {
        let mut command = Command::new("sleep");
        command.arg("30");
        let start = Instant::now();
        let result =
            WorkerHandle::spawn_command(command, Duration::from_secs(1), Duration::from_millis(200));
        assert!(matches!(result, Err(SupervisorError::HandshakeTimeout(_))));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_child_sees_command_pipe_on_fd3_and_message_pipe_on_fd4() {
        let (cmd_read, cmd_write) = create_pipe().unwrap();
        let (msg_read, msg_write) = create_pipe().unwrap();

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg("read -r line <&3; printf '%s' \"$line\" >&4");
        attach_ipc_fds(&mut command, cmd_read, msg_write, [cmd_write, msg_read]);
        let mut child = command.spawn().unwrap();
        close_fd(cmd_read);
        close_fd(msg_write);

        let mut to_child = unsafe { std::fs::File::from_raw_fd(cmd_write) };
        to_child.write_all(b"ping\n").unwrap();
        drop(to_child);

        let mut from_child = unsafe { std::fs::File::from_raw_fd(msg_read) };
        let mut echoed = String::new();
        from_child.read_to_string(&mut echoed).unwrap();

        assert_eq!(echoed, "ping");
        assert!(child.wait().unwrap().success());
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(250)), 250);
        assert_eq!(millis(Duration::from_secs(u64::MAX)), i32::MAX);
    }
}
