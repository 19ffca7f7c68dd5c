//! The run lifecycle state machine.
//!
//! ```text
//!                start()                 Exited event
//! NotStarted ───────────→ Running(Boot) ──────────────→ Exited(outcome)
//!                              │                ↑
//!                   first      │                │ Exited event
//!                timestamped   ▼                │
//!                   line   Running(Game) ───────┘
//! ```
//!
//! The machine does no I/O. Each transition returns a [`Step`] describing
//! what must be appended to the live log, which keeps the lifecycle rules
//! testable without spawning anything.

use std::fmt;
use std::path::PathBuf;

use mclaunch_output::{ClassifiedLine, Marker, OutputClassifier, Phase, RunKind};
use time::OffsetDateTime;

use crate::SupervisorError;

// ---------------------------------------------------------------------------
// Events and outcome
// ---------------------------------------------------------------------------

/// Something that happened to a running launcher process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A chunk read from stdout. Classified and logged.
    Stdout(Vec<u8>),

    /// A chunk read from stderr. Diagnostics only, never classified.
    Stderr(Vec<u8>),

    /// The process exited.
    Exited {
        /// Exit code, if the OS reported one (not on signal death).
        code: Option<i32>,
        /// When the exit was observed.
        at: OffsetDateTime,
    },
}

impl RunEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Stdout(_) => "stdout",
            Self::Stderr(_) => "stderr",
            Self::Exited { .. } => "exit",
        }
    }
}

/// How a run ended. Computed once, at exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// `false` if any stdout line reported `Game crashed!`.
    pub quit_cleanly: bool,

    /// The kind of run this was.
    pub kind: RunKind,

    /// When the exit was observed.
    pub exit_timestamp: OffsetDateTime,

    /// The process exit code, when available.
    pub exit_code: Option<i32>,

    /// Where the rotated log ended up. Filled in by the supervisor after
    /// rotation; `None` straight out of the state machine.
    pub log_artifact: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Created, process not started yet.
    NotStarted,

    /// Process running; the phase of the output seen so far.
    Running(Phase),

    /// Process gone. Terminal.
    Exited(RunOutcome),
}

impl RunState {
    fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Running(_) => "running",
            Self::Exited(_) => "exited",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running(phase) => write!(f, "running ({phase})"),
            other => f.write_str(other.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// What a transition asks the driver to append to the live log, in order:
/// `leading` markers, then `lines`, then `trailing` markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub leading: Vec<Marker>,
    pub lines: Vec<ClassifiedLine>,
    pub trailing: Vec<Marker>,
}

impl Step {
    /// `true` if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.lines.is_empty() && self.trailing.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RunMachine
// ---------------------------------------------------------------------------

/// The state of one supervised run.
///
/// Owns its own [`OutputClassifier`], so phase and crash tracking never
/// leak from one run into the next.
#[derive(Debug)]
pub struct RunMachine {
    kind: RunKind,
    state: RunState,
    classifier: OutputClassifier,
}

impl RunMachine {
    /// Creates a machine for a run of `kind`, in [`RunState::NotStarted`].
    pub fn new(kind: RunKind) -> Self {
        Self {
            kind,
            state: RunState::NotStarted,
            classifier: OutputClassifier::new(),
        }
    }

    /// The kind of run.
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// The current lifecycle state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Marks the process as started.
    ///
    /// Returns the `PROGRAMSTART, BOOTSTART` markers, which must be written
    /// before any output.
    ///
    /// # Errors
    /// [`SupervisorError::InvalidTransition`] unless the run is
    /// [`RunState::NotStarted`]: a run starts exactly once.
    pub fn start(&mut self) -> Result<Step, SupervisorError> {
        if !matches!(self.state, RunState::NotStarted) {
            return Err(SupervisorError::InvalidTransition {
                state: self.state.name(),
                event: "start",
            });
        }
        self.state = RunState::Running(Phase::Boot);
        Ok(Step {
            leading: Marker::start_sequence().to_vec(),
            ..Step::default()
        })
    }

    /// Feeds one event into a running machine.
    ///
    /// # Errors
    /// [`SupervisorError::InvalidTransition`] if the run hasn't started or
    /// has already exited.
    pub fn handle(&mut self, event: RunEvent) -> Result<Step, SupervisorError> {
        if !matches!(self.state, RunState::Running(_)) {
            return Err(SupervisorError::InvalidTransition {
                state: self.state.name(),
                event: event.name(),
            });
        }

        match event {
            RunEvent::Stdout(chunk) => {
                let lines = self.classifier.feed(&chunk);
                self.state = RunState::Running(self.classifier.phase());
                Ok(Step {
                    lines,
                    ..Step::default()
                })
            }
            RunEvent::Stderr(_) => Ok(Step::default()),
            RunEvent::Exited { code, at } => {
                // A final line without a trailing newline still belongs to
                // the run; it is classified before the end markers.
                let lines = self.classifier.finish();
                let phase = self.classifier.phase();
                self.state = RunState::Exited(RunOutcome {
                    quit_cleanly: self.classifier.quit_cleanly(),
                    kind: self.kind,
                    exit_timestamp: at,
                    exit_code: code,
                    log_artifact: None,
                });
                Ok(Step {
                    leading: Vec::new(),
                    lines,
                    trailing: Marker::end_sequence(phase).to_vec(),
                })
            }
        }
    }

    /// The outcome, once the run has exited.
    pub fn outcome(&self) -> Option<&RunOutcome> {
        match &self.state {
            RunState::Exited(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Consumes the machine, returning the outcome if the run has exited.
    pub fn into_outcome(self) -> Option<RunOutcome> {
        match self.state {
            RunState::Exited(outcome) => Some(outcome),
            _ => None,
        }
    }
}
