//! Worker Process Entry Point
//!
//! The child side of the supervisor-worker architecture. A worker runs one
//! sort at a time and has no cancellation points: the supervisor enforces
//! its timeout by killing the whole process, so no signal handler is
//! installed and SIGTERM keeps its default (terminate) action.
//!
//! On Unix, uses the fd pair named by `SORTBENCH_IPC_FD` (normally 3/4). On
//! non-Unix, or when the variable is absent, falls back to stdin/stdout.

use crate::job::{JobError, run_job};
use sortbench_ipc::{
    FailureKind, FrameError, FrameReader, FrameWriter, IPC_FD_ENV, JobRequest, SupervisorCommand,
    WorkerCapabilities, WorkerMessage,
};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::sync::Once;

#[cfg(unix)]
use std::os::unix::io::FromRawFd;

/// IPC transport: either inherited fd pair or stdin/stdout fallback.
enum IpcTransport {
    #[cfg(unix)]
    Fds { read_fd: i32, write_fd: i32 },
    Stdio,
}

fn detect_transport() -> IpcTransport {
    #[cfg(unix)]
    if let Ok(val) = std::env::var(IPC_FD_ENV) {
        if let Some((r, w)) = parse_fd_pair(&val) {
            return IpcTransport::Fds {
                read_fd: r,
                write_fd: w,
            };
        }
        tracing::warn!(
            "invalid {}={:?} (expected <read_fd>,<write_fd>), falling back to stdio",
            IPC_FD_ENV,
            val
        );
    }
    IpcTransport::Stdio
}

fn parse_fd_pair(val: &str) -> Option<(i32, i32)> {
    let (r, w) = val.split_once(',')?;
    Some((r.trim().parse().ok()?, w.trim().parse().ok()?))
}

thread_local! {
    /// Backtrace of the most recent panic on this thread, taken at the panic site
    static PANIC_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a hook that records the panicking thread's backtrace before unwinding.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::capture();
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
    });
}

/// Take the backtrace recorded by the last panic on this thread, if any.
fn take_panic_backtrace() -> Option<Backtrace> {
    PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

/// Worker main loop
pub struct WorkerMain {
    reader: FrameReader<Box<dyn std::io::Read>>,
    writer: FrameWriter<Box<dyn std::io::Write>>,
}

impl WorkerMain {
    /// Create a new worker on the inherited fds, or stdin/stdout without them.
    pub fn new() -> Self {
        match detect_transport() {
            #[cfg(unix)]
            IpcTransport::Fds { read_fd, write_fd } => {
                // SAFETY: the supervisor dup'd these fds into the child for our exclusive use
                let read_file = unsafe { std::fs::File::from_raw_fd(read_fd) };
                let write_file = unsafe { std::fs::File::from_raw_fd(write_fd) };
                Self::with_io(Box::new(read_file), Box::new(write_file))
            }
            IpcTransport::Stdio => Self::with_io(Box::new(std::io::stdin()), Box::new(std::io::stdout())),
        }
    }

    /// Create a worker over arbitrary streams
    pub fn with_io(reader: Box<dyn std::io::Read>, writer: Box<dyn std::io::Write>) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
        }
    }

    /// Run the worker main loop until `Shutdown` or the supervisor hangs up.
    pub fn run(&mut self) -> Result<(), FrameError> {
        install_panic_hook();
        self.writer
            .write(&WorkerMessage::Hello(WorkerCapabilities::default()))?;

        loop {
            let command: SupervisorCommand = match self.reader.read() {
                Ok(command) => command,
                Err(FrameError::EndOfStream) => break,
                Err(e) => return Err(e),
            };

            match command {
                SupervisorCommand::Run(job) => self.run_job(job)?,
                SupervisorCommand::Shutdown => break,
            }
        }

        Ok(())
    }

    fn run_job(&mut self, job: JobRequest) -> Result<(), FrameError> {
        let JobRequest {
            job_id,
            method,
            mut data,
        } = job;
        tracing::debug!(job_id, method = %method, size = data.len(), "worker running job");

        let reply = match run_job(&method, &mut data) {
            Ok(run) => WorkerMessage::Complete {
                job_id,
                comparisons: run.metrics.comparisons,
                movements: run.metrics.movements,
                duration_nanos: run.elapsed.as_nanos() as u64,
            },
            Err(e) => {
                let kind = match e {
                    JobError::UnknownMethod(_) => FailureKind::UnknownMethod,
                    JobError::Panicked(_) => FailureKind::Panic,
                };
                let backtrace = match take_panic_backtrace() {
                    Some(bt)
                        if kind == FailureKind::Panic && bt.status() == BacktraceStatus::Captured =>
                    {
                        Some(bt.to_string())
                    }
                    _ => None,
                };
                WorkerMessage::Failure {
                    job_id,
                    kind,
                    message: e.to_string(),
                    backtrace,
                }
            }
        };

        self.writer.write(&reply)
    }
}

impl Default for WorkerMain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// Writer that keeps its bytes reachable after the worker is done with it
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn commands(cmds: &[SupervisorCommand]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = FrameWriter::new(&mut buffer);
            for cmd in cmds {
                writer.write(cmd).unwrap();
            }
        }
        buffer
    }

    fn replies(output: &SharedBuf) -> Vec<WorkerMessage> {
        let bytes = output.0.lock().unwrap().clone();
        let mut reader = FrameReader::new(Cursor::new(bytes));
        let mut messages = Vec::new();
        while let Ok(msg) = reader.read::<WorkerMessage>() {
            messages.push(msg);
        }
        messages
    }

    #[test]
    fn test_parse_fd_pair() {
        assert_eq!(parse_fd_pair("3,4"), Some((3, 4)));
        assert_eq!(parse_fd_pair(" 3 , 4 "), Some((3, 4)));
        assert_eq!(parse_fd_pair("3"), None);
        assert_eq!(parse_fd_pair("a,4"), None);
    }

    #[test]
    fn test_worker_answers_jobs_in_order() {
        let input = commands(&[
            SupervisorCommand::Run(JobRequest {
                job_id: 1,
                method: "Select".to_string(),
                data: vec![3, 2, 1, 5, 4],
            }),
            SupervisorCommand::Run(JobRequest {
                job_id: 2,
                method: "Quick".to_string(),
                data: vec![1],
            }),
            SupervisorCommand::Shutdown,
        ]);
        let output = SharedBuf::default();

        let mut worker = WorkerMain::with_io(Box::new(Cursor::new(input)), Box::new(output.clone()));
        worker.run().unwrap();

        let messages = replies(&output);
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], WorkerMessage::Hello(_)));
        match &messages[1] {
            WorkerMessage::Complete {
                job_id,
                comparisons,
                movements,
                ..
            } => {
                assert_eq!(*job_id, 1);
                assert_eq!(*comparisons, 10);
                assert_eq!(*movements, 6);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
        match &messages[2] {
            WorkerMessage::Failure { job_id, kind, .. } => {
                assert_eq!(*job_id, 2);
                assert_eq!(*kind, FailureKind::UnknownMethod);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_panic_backtrace_is_recorded_at_the_panic_site() {
        install_panic_hook();
        let _ = take_panic_backtrace();

        let result = std::panic::catch_unwind(|| panic!("sort blew up"));
        assert!(result.is_err());

        assert!(take_panic_backtrace().is_some());
        // Consumed by the first take
        assert!(take_panic_backtrace().is_none());
    }

    #[test]
    fn test_worker_exits_cleanly_when_supervisor_hangs_up() {
        let output = SharedBuf::default();
        let mut worker =
            WorkerMain::with_io(Box::new(Cursor::new(Vec::new())), Box::new(output.clone()));
        assert!(worker.run().is_ok());
        assert_eq!(replies(&output).len(), 1);
    }
}
