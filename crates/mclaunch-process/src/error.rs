//! Error types for the process layer.

use std::path::PathBuf;

use mclaunch_log::LogError;

use crate::RunOutcome;

/// Errors that can occur while supervising one launcher run.
///
/// All of them are scoped to that run: nothing here leaves shared state
/// behind that could affect the next run.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The launcher process could not be started (missing executable,
    /// not executable, …). Fatal to the run, never retried.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A piped stdio handle was not available after spawning.
    #[error("failed to capture launcher {0}")]
    Pipe(&'static str),

    /// Waiting for the launcher to exit failed.
    #[error("failed waiting for launcher exit: {0}")]
    Wait(#[source] std::io::Error),

    /// The run's live log could not be opened. Nothing was spawned.
    #[error("failed to open live log: {0}")]
    LogOpen(#[source] LogError),

    /// Writing or rotating the run's log failed. The launcher was left to
    /// finish, so `outcome` is the complete result of the run; `source` is
    /// the first log failure.
    #[error("launcher run finished but its log is incomplete: {source}")]
    LogWrite {
        outcome: Box<RunOutcome>,
        #[source]
        source: LogError,
    },

    /// The run state machine received an event it can't accept in its
    /// current state (for example output after exit).
    #[error("invalid run transition: {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}
