//! Turning raw launcher stdout into phase-tagged lines.
//!
//! The launcher prints two very different kinds of output into one pipe:
//! its own boot chatter (resolving versions, downloading libraries) and,
//! once the game is running, the game's log. The only reliable way to tell
//! them apart is that game log lines carry an `HH:MM:SS` timestamp and boot
//! lines never do.
//!
//! Two entry points:
//!
//! - [`classify`]: a pure function over one chunk of text and the current
//!   phase. Easy to test, no state.
//! - [`OutputClassifier`]: the per-run wrapper the supervisor drives. It
//!   owns the phase and the crash flag, and carries a partial trailing line
//!   from one pipe read to the next.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ClassifiedLine, Marker, Phase};

/// The substring the game prints when it dies.
const CRASH_SIGNAL: &str = "Game crashed!";

/// Longest unterminated fragment held back between reads. A fragment that
/// reaches this size is classified as a line of its own.
pub const MAX_PENDING_LINE: usize = 64 * 1024;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"\r\n|\n|\r"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| compile_regex(r" {2,}"));
static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"(?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// Classifies one chunk of launcher output.
///
/// Returns the classified lines in input order and the phase to use for
/// the next chunk.
///
/// # Algorithm
///
/// 1. Split on any line ending, collapse runs of spaces, and drop lines
///    with no word characters (blank lines, bare punctuation).
/// 2. A line containing an `HH:MM:SS` timestamp is a game line; anything
///    else is a boot line.
/// 3. The first game line seen while in [`Phase::Boot`] carries the
///    markers `BOOTEND, GAMESTART` and moves the phase to [`Phase::Game`].
///    There is no way back: once in game, every later line is tagged game.
/// 4. A line containing `Game crashed!` is flagged as a crash.
pub fn classify(chunk: &str, current_phase: Phase) -> (Vec<ClassifiedLine>, Phase) {
    let mut phase = current_phase;
    let mut lines = Vec::new();

    for raw in LINE_BREAK.split(chunk) {
        if !has_word_char(raw) {
            continue;
        }
        let text = SPACE_RUN.replace_all(raw, " ").into_owned();

        let detected = if TIMESTAMP.is_match(&text) {
            Phase::Game
        } else {
            Phase::Boot
        };

        let mut markers = Vec::new();
        if phase == Phase::Boot && detected == Phase::Game {
            markers.push(Marker::BootEnd);
            markers.push(Marker::GameStart);
            phase = Phase::Game;
        }

        let crashed = text.contains(CRASH_SIGNAL);
        lines.push(ClassifiedLine {
            text,
            phase,
            markers,
            crashed,
        });
    }

    (lines, phase)
}

/// Mirrors the `\w` test: ASCII letters, digits, and underscore.
fn has_word_char(line: &str) -> bool {
    line.bytes().any(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// ---------------------------------------------------------------------------
// OutputClassifier
// ---------------------------------------------------------------------------

/// Per-run classification state.
///
/// One of these is created for every supervised run, so two runs never
/// share a phase or a crash flag.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ feed(chunk) ──→ feed(chunk) ──→ … ──→ finish()
///  Boot       Boot | Game                           flushes the tail
/// ```
#[derive(Debug)]
pub struct OutputClassifier {
    phase: Phase,

    /// Starts `true`; flips to `false` on the first crash line and stays.
    quit_cleanly: bool,

    /// Bytes after the last line terminator of the previous chunk.
    ///
    /// A pipe read can end in the middle of a line. Holding the fragment
    /// back means the line is classified whole once the rest arrives.
    pending: Vec<u8>,
}

impl Default for OutputClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputClassifier {
    /// Creates a classifier for a fresh run: boot phase, clean so far.
    pub fn new() -> Self {
        Self {
            phase: Phase::Boot,
            quit_cleanly: true,
            pending: Vec::new(),
        }
    }

    /// The phase the next line will be classified against.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `false` once any line reported a crash.
    pub fn quit_cleanly(&self) -> bool {
        self.quit_cleanly
    }

    /// Classifies every complete line in `chunk` (plus any fragment left
    /// over from the previous call).
    ///
    /// A fragment of [`MAX_PENDING_LINE`] bytes or more is not held back
    /// any longer; it is classified as if it were terminated.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ClassifiedLine> {
        self.pending.extend_from_slice(chunk);

        let mut lines = match self
            .pending
            .iter()
            .rposition(|&b| b == b'\n' || b == b'\r')
        {
            Some(last_break) => {
                // `split_off` leaves `[..=last_break]` in `pending` and
                // returns the tail; swap them so `pending` keeps only the
                // unterminated fragment.
                let tail = self.pending.split_off(last_break + 1);
                let complete = std::mem::replace(&mut self.pending, tail);
                self.classify_bytes(&complete)
            }
            None => Vec::new(),
        };

        if self.pending.len() >= MAX_PENDING_LINE {
            tracing::debug!(bytes = self.pending.len(), "flushing oversized line fragment");
            lines.extend(self.finish());
        }
        lines
    }

    /// Flushes the unterminated fragment, if any. Call once at end of stream.
    pub fn finish(&mut self) -> Vec<ClassifiedLine> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.pending);
        self.classify_bytes(&rest)
    }

    fn classify_bytes(&mut self, bytes: &[u8]) -> Vec<ClassifiedLine> {
        let text = String::from_utf8_lossy(bytes);
        let (lines, next) = classify(&text, self.phase);

        if next != self.phase {
            tracing::debug!(from = %self.phase, to = %next, "phase transition");
        }
        self.phase = next;

        if self.quit_cleanly && lines.iter().any(|line| line.crashed) {
            tracing::debug!("crash signal observed");
            self.quit_cleanly = false;
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[ClassifiedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    // =====================================================================
    // classify()
    // =====================================================================

    #[test]
    fn test_classify_untimestamped_lines_stay_boot() {
        let (lines, next) =
            classify("Resolving version 1.20.4\nDownloading libraries\n", Phase::Boot);

        assert_eq!(texts(&lines), ["Resolving version 1.20.4", "Downloading libraries"]);
        assert!(lines.iter().all(|l| l.phase == Phase::Boot));
        assert!(lines.iter().all(|l| l.markers.is_empty()));
        assert_eq!(next, Phase::Boot);
    }

    #[test]
    fn test_classify_first_timestamp_emits_transition_once() {
        let chunk = "Launching\n[12:00:01] [main/INFO]: Loading\n[12:00:02] [main/INFO]: Ready\n";

        let (lines, next) = classify(chunk, Phase::Boot);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].phase, Phase::Boot);
        assert_eq!(lines[1].markers, vec![Marker::BootEnd, Marker::GameStart]);
        assert_eq!(lines[1].phase, Phase::Game);
        assert!(lines[2].markers.is_empty(), "transition must fire only once");
        assert_eq!(next, Phase::Game);
    }

    #[test]
    fn test_classify_in_game_never_returns_to_boot() {
        let (lines, next) = classify("no timestamp here\n", Phase::Game);

        assert_eq!(lines[0].phase, Phase::Game);
        assert!(lines[0].markers.is_empty());
        assert_eq!(next, Phase::Game);
    }

    #[test]
    fn test_classify_timestamp_first_line_still_transitions() {
        let (lines, _) = classify("[23:59:59] hello", Phase::Boot);

        assert_eq!(lines[0].markers, vec![Marker::BootEnd, Marker::GameStart]);
        assert_eq!(lines[0].phase, Phase::Game);
    }

    #[test]
    fn test_classify_out_of_range_timestamp_is_boot() {
        // 24 is not a valid hour, 60 not a valid minute.
        let (lines, next) = classify("at 24:00:00\nat 10:60:00\n", Phase::Boot);

        assert!(lines.iter().all(|l| l.phase == Phase::Boot));
        assert_eq!(next, Phase::Boot);
    }

    #[test]
    fn test_classify_splits_on_every_line_ending() {
        let (lines, _) = classify("a\r\nb\rc\nd", Phase::Boot);

        assert_eq!(texts(&lines), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_classify_collapses_space_runs() {
        let (lines, _) = classify("too    many   spaces", Phase::Boot);

        assert_eq!(lines[0].text, "too many spaces");
    }

    #[test]
    fn test_classify_drops_lines_without_word_chars() {
        let (lines, _) = classify("\n   \n---\nkept\n\n", Phase::Boot);

        assert_eq!(texts(&lines), ["kept"]);
    }

    #[test]
    fn test_classify_flags_crash_line() {
        let (lines, _) = classify("[10:00:00] ---- Game crashed! ----\nfine\n", Phase::Game);

        assert!(lines[0].crashed);
        assert!(!lines[1].crashed);
    }

    // =====================================================================
    // OutputClassifier
    // =====================================================================

    #[test]
    fn test_classifier_new_starts_boot_and_clean() {
        let c = OutputClassifier::new();

        assert_eq!(c.phase(), Phase::Boot);
        assert!(c.quit_cleanly());
    }

    #[test]
    fn test_classifier_default_matches_new() {
        let c = OutputClassifier::default();

        assert_eq!(c.phase(), Phase::Boot);
        assert!(c.quit_cleanly());
    }

    #[test]
    fn test_classifier_joins_line_split_across_chunks() {
        let mut c = OutputClassifier::new();

        // The timestamp is cut in half by the pipe read.
        let first = c.feed(b"Installing\n[12:0");
        let second = c.feed(b"0:01] started\n");

        assert_eq!(texts(&first), ["Installing"]);
        assert_eq!(texts(&second), ["[12:00:01] started"]);
        assert_eq!(second[0].markers, vec![Marker::BootEnd, Marker::GameStart]);
        assert_eq!(c.phase(), Phase::Game);
    }

    #[test]
    fn test_classifier_finish_flushes_unterminated_tail() {
        let mut c = OutputClassifier::new();

        assert!(c.feed(b"no newline yet").is_empty());
        let tail = c.finish();

        assert_eq!(texts(&tail), ["no newline yet"]);
        assert!(c.finish().is_empty(), "second finish has nothing left");
    }

    #[test]
    fn test_classifier_flushes_oversized_fragment() {
        let mut c = OutputClassifier::new();
        let long = vec![b'a'; MAX_PENDING_LINE];

        let lines = c.feed(&long);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text.len(), MAX_PENDING_LINE);
        assert!(c.finish().is_empty(), "nothing left pending");
    }

    #[test]
    fn test_classifier_holds_fragment_below_cap() {
        let mut c = OutputClassifier::new();

        assert!(c.feed(&vec![b'a'; MAX_PENDING_LINE - 1]).is_empty());
        assert_eq!(c.finish().len(), 1);
    }

    #[test]
    fn test_classifier_crash_is_sticky() {
        let mut c = OutputClassifier::new();

        c.feed(b"[10:00:00] Game crashed!\n");
        assert!(!c.quit_cleanly());

        c.feed(b"[10:00:01] recovered?\n");
        assert!(!c.quit_cleanly(), "quit_cleanly must never flip back");
    }

    #[test]
    fn test_classifier_transition_fires_once_across_chunks() {
        let mut c = OutputClassifier::new();

        let a = c.feed(b"[10:00:00] one\n");
        let b = c.feed(b"[10:00:01] two\nboot-looking line\n");

        let marker_count: usize = a
            .iter()
            .chain(b.iter())
            .map(|l| l.markers.len())
            .sum();
        assert_eq!(marker_count, 2);
        assert!(b.iter().all(|l| l.phase == Phase::Game));
    }
}
