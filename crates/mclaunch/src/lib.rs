//! # mclaunch
//!
//! Supervised `portablemc` launches with phase-annotated logs and cached
//! Microsoft sessions.
//!
//! mclaunch runs the external launcher for you, splits its output into a
//! boot segment and a game segment, and keeps every run as a timestamped
//! log file. Users who already logged in once are picked up from the
//! launcher's own session cache, so they aren't asked to log in again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mclaunch::prelude::*;
//!
//! # async fn demo() -> Result<(), LaunchError> {
//! let config = LauncherConfig::builder()
//!     .log_location("logs")
//!     .build()?;
//! let mut launcher = Launcher::new(config);
//!
//! launcher.authenticate("player@example.com").await?;
//! let quit_cleanly = launcher
//!     .launch_game(LaunchOptions::default(), false)
//!     .await?;
//! # let _ = quit_cleanly;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod launcher;
mod manifest;

pub use config::{DEFAULT_LOG_LOCATION, LauncherConfig, LauncherConfigBuilder};
pub use error::{ConfigError, LaunchError, ManifestError};
pub use launcher::{DEFAULT_VERSION, LaunchOptions, Launcher, Loader, UnknownLoader};
pub use manifest::{LatestVersions, MANIFEST_FILE_NAME, VersionEntry, VersionManifest};

/// Everything needed to configure and drive a launcher.
pub mod prelude {
    pub use crate::{LaunchError, LaunchOptions, Launcher, LauncherConfig, Loader};
    pub use mclaunch_output::RunKind;
    pub use mclaunch_process::{ProcessSupervisor, RunOutcome, Runner};
    pub use mclaunch_session::{AuthenticatedUser, AuthedUserEntry};
}
