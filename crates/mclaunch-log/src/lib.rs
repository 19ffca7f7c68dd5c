//! Session log recording for mclaunch.
//!
//! Every supervised run writes its classified output to a live log,
//! `<root>/<kind>/latest.log`. When the run exits, the live log is copied
//! into a permanent artifact named after the exit time and then emptied:
//!
//! ```text
//! logs/
//! ├── auth/   latest.log, 2026-10-17T05;49;00.log, …
//! ├── game/   latest.log, …
//! └── other/  latest.log, …
//! ```
//!
//! Colons are path-hostile on some filesystems, so the artifact name uses
//! `;` between hour, minute and second.

mod error;
mod recorder;

pub use error::LogError;
pub use recorder::{LIVE_LOG_NAME, LiveLog, SessionLogRecorder, artifact_stem};
