//! Output model and classifier for mclaunch.
//!
//! This crate defines the "vocabulary" every other layer uses to talk about
//! a supervised launcher run:
//!
//! - **Types** ([`RunKind`], [`Phase`], [`Marker`], [`ClassifiedLine`]):
//!   what kind of run this is, which segment of the output we are in, and
//!   the synthetic lines written around phase boundaries.
//! - **Classifier** ([`classify`], [`OutputClassifier`]): how raw stdout
//!   bytes become tagged lines.
//!
//! # Architecture
//!
//! The output layer sits between the process (raw bytes) and the log
//! recorder (durable lines). It doesn't know about files or child
//! processes; it only turns text into classified lines.
//!
//! ```text
//! Process (stdout bytes) → Output (ClassifiedLine) → Log (latest.log)
//! ```

mod classify;
mod types;

pub use classify::{MAX_PENDING_LINE, OutputClassifier, classify};
pub use types::{ClassifiedLine, Marker, Phase, RunKind};
