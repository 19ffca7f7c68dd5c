//! Core types shared by every mclaunch layer.
//!
//! These replace the ad-hoc strings a launcher wrapper would otherwise pass
//! around ("auth", "boot", "BOOTEND"...). Because they are enums, a `match`
//! over them is checked for exhaustiveness by the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RunKind: which log a run belongs to
// ---------------------------------------------------------------------------

/// The logical category of a supervised launcher invocation.
///
/// Set once when a run starts and never changed. It decides which
/// sub-directory of the log root the run's output lands in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// `login` / `logout` runs.
    Auth,
    /// `start` runs (including `--dry` installs).
    Game,
    /// Everything else, e.g. the `search` metadata refresh.
    #[default]
    Other,
}

impl RunKind {
    /// Every kind, in a stable order. Used to bootstrap log directories.
    pub const ALL: [RunKind; 3] = [RunKind::Auth, RunKind::Game, RunKind::Other];

    /// The log sub-directory name for this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Game => "game",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

// ---------------------------------------------------------------------------
// Phase: boot vs. game segment of one run
// ---------------------------------------------------------------------------

/// Which segment of a run's output is currently being classified.
///
/// Every run starts in [`Phase::Boot`] (installer, downloads, version
/// resolution). The first timestamped line moves it to [`Phase::Game`] and
/// it never moves back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Boot,
    Game,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boot => write!(f, "boot"),
            Self::Game => write!(f, "game"),
        }
    }
}

// ---------------------------------------------------------------------------
// Marker: synthetic boundary lines
// ---------------------------------------------------------------------------

/// A synthetic line written to the log at a lifecycle boundary.
///
/// Readers of the log split it into segments by looking for these exact
/// upper-case words on a line of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Marker {
    ProgramStart,
    BootStart,
    BootEnd,
    GameStart,
    GameEnd,
    ProgramEnd,
}

impl Marker {
    /// The text written to the log for this marker.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProgramStart => "PROGRAMSTART",
            Self::BootStart => "BOOTSTART",
            Self::BootEnd => "BOOTEND",
            Self::GameStart => "GAMESTART",
            Self::GameEnd => "GAMEEND",
            Self::ProgramEnd => "PROGRAMEND",
        }
    }

    /// Markers written once when a process starts, before any output.
    pub fn start_sequence() -> [Marker; 2] {
        [Self::ProgramStart, Self::BootStart]
    }

    /// Markers written once when a process exits in the given phase.
    pub fn end_sequence(phase: Phase) -> [Marker; 2] {
        match phase {
            Phase::Boot => [Self::BootEnd, Self::ProgramEnd],
            Phase::Game => [Self::GameEnd, Self::ProgramEnd],
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClassifiedLine
// ---------------------------------------------------------------------------

/// One line of launcher output after classification.
///
/// Ephemeral: produced by the classifier, written by the log recorder,
/// then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// The normalized line text (no line terminator).
    pub text: String,

    /// The phase this line was attributed to.
    pub phase: Phase,

    /// Markers that must be written immediately before `text`.
    /// Either empty or `[BootEnd, GameStart]` on the boot→game transition.
    pub markers: Vec<Marker>,

    /// `true` if the line reports that the game crashed.
    pub crashed: bool,
}
