//! The async driver: spawns the launcher and feeds its run machine.
//!
//! One call to [`ProcessSupervisor::supervise`] is one run. Two reader
//! tasks pump the child's stdout and stderr into an mpsc channel; the
//! calling task drains that channel in arrival order, so every chunk is
//! classified and logged before the next one is looked at.
//!
//! ```text
//!  child stdout ──reader task──┐
//!                              ├──→ mpsc ──→ RunMachine ──→ LiveLog
//!  child stderr ──reader task──┘                   (stderr → tracing)
//! ```

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use mclaunch_log::{LiveLog, LogError, SessionLogRecorder};
use mclaunch_output::RunKind;
use time::OffsetDateTime;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::{RunEvent, RunMachine, RunOutcome, Step, SupervisorError};

/// Capacity of the event channel between reader tasks and the run loop.
const CHANNEL_CAPACITY: usize = 64;

/// Size of a single pipe read.
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Runs the external launcher.
///
/// This is the seam between the orchestrator and the operating system.
/// [`ProcessSupervisor`] spawns real processes; tests substitute a fake
/// that records the argument vectors it was asked to run.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → a runner can be shared with spawned tasks.
/// - The returned future is `Send` so callers can `tokio::spawn` a launch.
pub trait Runner: Send + Sync + 'static {
    /// Runs the launcher with `args` as a run of `kind` and waits for it
    /// to exit.
    fn run(
        &self,
        args: &[String],
        kind: RunKind,
    ) -> impl Future<Output = Result<RunOutcome, SupervisorError>> + Send;
}

/// Spawns the launcher executable and supervises it until exit.
///
/// Does not serialize runs: two concurrent runs of the same [`RunKind`]
/// would share a live log. Callers start one run per kind at a time.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    program: PathBuf,
    main_dir: Option<PathBuf>,
    recorder: SessionLogRecorder,
}

impl ProcessSupervisor {
    /// Creates a supervisor for the executable at `program`.
    ///
    /// When `main_dir` is set, every run is prefixed with
    /// `--main-dir <main_dir>`.
    pub fn new(
        program: impl Into<PathBuf>,
        main_dir: Option<PathBuf>,
        recorder: SessionLogRecorder,
    ) -> Self {
        Self {
            program: program.into(),
            main_dir,
            recorder,
        }
    }

    /// The executable this supervisor runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The recorder runs are logged through.
    pub fn recorder(&self) -> &SessionLogRecorder {
        &self.recorder
    }

    /// The full argument vector for a run: the main-dir flag (if any)
    /// followed by `args`.
    pub fn command_args(&self, args: &[String]) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        if let Some(dir) = &self.main_dir {
            argv.push(OsString::from("--main-dir"));
            argv.push(dir.as_os_str().to_os_string());
        }
        argv.extend(args.iter().map(OsString::from));
        argv
    }

    /// Spawns one run and waits for it to finish.
    ///
    /// The live log for `kind` is truncated before the process starts and
    /// rotated after it exits.
    ///
    /// # Errors
    /// - [`SupervisorError::LogOpen`] if the live log can't be opened.
    /// - [`SupervisorError::Spawn`] if the process can't be started.
    /// - [`SupervisorError::LogWrite`] if any log write or the rotation
    ///   failed. The process still ran to completion; the error carries
    ///   its outcome and is reported afterwards.
    pub async fn supervise(
        &self,
        args: &[String],
        kind: RunKind,
    ) -> Result<RunOutcome, SupervisorError> {
        let mut live = self.recorder.open(kind).await.map_err(SupervisorError::LogOpen)?;

        let mut child = Command::new(&self.program)
            .args(self.command_args(args))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::info!(
            %kind,
            program = %self.program.display(),
            pid = ?child.id(),
            "launcher started"
        );

        let stdout = child.stdout.take().ok_or(SupervisorError::Pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(SupervisorError::Pipe("stderr"))?;

        // Keep the first log failure, but keep going: the launcher must be
        // allowed to finish no matter what happens to our log file.
        let mut log_error: Option<LogError> = None;

        let mut machine = RunMachine::new(kind);
        let step = machine.start()?;
        record(&mut live, &step, &mut log_error).await;

        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(pump(stdout, tx.clone(), RunEvent::Stdout));
        tokio::spawn(pump(stderr, tx, RunEvent::Stderr));

        // The channel closes once both pipes hit EOF and their reader
        // tasks drop their senders.
        while let Some(event) = rx.recv().await {
            if let RunEvent::Stderr(bytes) = &event {
                let text = String::from_utf8_lossy(bytes);
                tracing::warn!(target: "mclaunch::stderr", %kind, "{}", text.trim_end());
            }
            let step = machine.handle(event)?;
            record(&mut live, &step, &mut log_error).await;
        }

        let status = child.wait().await.map_err(SupervisorError::Wait)?;
        let step = machine.handle(RunEvent::Exited {
            code: status.code(),
            at: OffsetDateTime::now_utc(),
        })?;
        record(&mut live, &step, &mut log_error).await;

        let mut outcome = machine.into_outcome().ok_or(SupervisorError::InvalidTransition {
            state: "running",
            event: "outcome",
        })?;

        match live.rotate(outcome.exit_timestamp).await {
            Ok(artifact) => outcome.log_artifact = Some(artifact),
            Err(e) => {
                tracing::warn!(%kind, error = %e, "log rotation failed");
                log_error.get_or_insert(e);
            }
        }

        tracing::info!(
            %kind,
            code = ?outcome.exit_code,
            quit_cleanly = outcome.quit_cleanly,
            "launcher exited"
        );

        match log_error {
            Some(source) => Err(SupervisorError::LogWrite {
                outcome: Box::new(outcome),
                source,
            }),
            None => Ok(outcome),
        }
    }
}

impl Runner for ProcessSupervisor {
    async fn run(
        &self,
        args: &[String],
        kind: RunKind,
    ) -> Result<RunOutcome, SupervisorError> {
        self.supervise(args, kind).await
    }
}

/// Writes a step to the live log, remembering the first failure.
async fn record(live: &mut LiveLog, step: &Step, log_error: &mut Option<LogError>) {
    for line in &step.lines {
        tracing::info!(target: "mclaunch::output", phase = %line.phase, "{}", line.text);
    }

    let result = async {
        if !step.leading.is_empty() {
            live.append_markers(&step.leading).await?;
        }
        live.append(&step.lines).await?;
        if !step.trailing.is_empty() {
            live.append_markers(&step.trailing).await?;
        }
        Ok::<(), LogError>(())
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(kind = %live.kind(), error = %e, "live log write failed");
        log_error.get_or_insert(e);
    }
}

/// Reads `reader` to EOF, sending each chunk as an event.
async fn pump<R>(mut reader: R, tx: mpsc::Sender<RunEvent>, wrap: fn(Vec<u8>) -> RunEvent)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(wrap(buf[..n].to_vec())).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "launcher pipe read failed");
                break;
            }
        }
    }
}
