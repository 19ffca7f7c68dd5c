//! Launcher process supervision for mclaunch.
//!
//! Each supervised run is an explicit state machine ([`RunMachine`]) driven
//! by events: one per chunk of output, one for exit. The
//! [`ProcessSupervisor`] is the async driver that spawns the launcher,
//! pumps its pipes into an event channel, and writes what the machine
//! produces to the run's live log.
//!
//! # Key types
//!
//! - [`Runner`]: the trait the orchestrator depends on (mockable in tests)
//! - [`ProcessSupervisor`]: the real implementation backed by `tokio::process`
//! - [`RunMachine`] / [`RunState`]: `NotStarted → Running(Phase) → Exited`
//! - [`RunOutcome`]: how a run ended

#![allow(async_fn_in_trait)]

mod error;
mod run;
mod supervisor;

pub use error::SupervisorError;
pub use run::{RunEvent, RunMachine, RunOutcome, RunState, Step};
pub use supervisor::{ProcessSupervisor, Runner};
