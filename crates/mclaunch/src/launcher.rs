//! The orchestrator: authentication, logout, listing users, launching.
//!
//! [`Launcher`] turns high-level requests into launcher argument vectors,
//! hands them to a [`Runner`], and interprets the results.
//!
//! ```text
//!  authenticate(email) ──cached?──yes──→ select user
//!                           │
//!                           no ──→ run `login` (Auth) ──→ re-read cache
//!
//!  launch_game(opts) ──loader ok?──→ manifest (run `search` if missing)
//!                                      │
//!                                      └──→ resolve version ──→ run `start` (Game)
//! ```

use std::fmt;
use std::str::FromStr;

use mclaunch_log::SessionLogRecorder;
use mclaunch_output::RunKind;
use mclaunch_process::{ProcessSupervisor, RunOutcome, Runner, SupervisorError};
use mclaunch_session::{AuthenticatedUser, AuthedUserEntry, SessionStore, redact};
use serde::{Deserialize, Serialize};

use crate::{LaunchError, LauncherConfig, VersionManifest};

/// Version used when a launch doesn't name one.
pub const DEFAULT_VERSION: &str = "release";

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Mod loaders the launcher accepts. Anything else is refused before a
/// process is spawned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    #[default]
    Standard,
    Forge,
    NeoForge,
    LegacyFabric,
    Quilt,
    Fabric,
}

impl Loader {
    pub const ALL: [Loader; 6] = [
        Loader::Standard,
        Loader::Forge,
        Loader::NeoForge,
        Loader::LegacyFabric,
        Loader::Quilt,
        Loader::Fabric,
    ];

    /// The name `portablemc start` expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Loader::Standard => "standard",
            Loader::Forge => "forge",
            Loader::NeoForge => "neoforge",
            Loader::LegacyFabric => "legacyfabric",
            Loader::Quilt => "quilt",
            Loader::Fabric => "fabric",
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a loader name isn't in [`Loader::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loader: {0}")]
pub struct UnknownLoader(pub String);

impl FromStr for Loader {
    type Err = UnknownLoader;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Loader::ALL
            .into_iter()
            .find(|loader| loader.as_str() == s)
            .ok_or_else(|| UnknownLoader(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// LaunchOptions
// ---------------------------------------------------------------------------

/// What to launch.
///
/// Both fields are free-form so that callers can pass through user input;
/// [`Launcher::launch_game`] validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// A version id, or `release`/`snapshot`. Defaults to `release`.
    #[serde(default)]
    pub version: Option<String>,
    /// One of the [`Loader`] names. Defaults to `standard`.
    #[serde(default)]
    pub loader: Option<String>,
}

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// Drives the external launcher on behalf of one user at a time.
///
/// Generic over the [`Runner`] so the orchestration logic can be tested
/// without spawning anything; [`Launcher::new`] wires in the real
/// [`ProcessSupervisor`].
pub struct Launcher<R: Runner = ProcessSupervisor> {
    config: LauncherConfig,
    runner: R,
    store: SessionStore,
}

impl Launcher<ProcessSupervisor> {
    /// Creates a launcher that spawns `portablemc` for real.
    pub fn new(config: LauncherConfig) -> Self {
        let recorder = SessionLogRecorder::new(config.log_location());
        let runner = ProcessSupervisor::new(
            config.exe_location(),
            Some(config.main_dir().to_path_buf()),
            recorder,
        );
        Self::with_runner(config, runner)
    }
}

impl<R: Runner> Launcher<R> {
    /// Creates a launcher that delegates runs to `runner`.
    pub fn with_runner(config: LauncherConfig, runner: R) -> Self {
        let store = SessionStore::new(config.main_dir());
        Self {
            config,
            runner,
            store,
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The user selected by the last successful [`authenticate`](Self::authenticate).
    pub fn current_user(&self) -> Option<&AuthenticatedUser> {
        self.store.current()
    }

    /// Makes `email` the current user, logging in first if the launcher
    /// has no session cached for it.
    ///
    /// A cached session is used without spawning anything. Otherwise a
    /// `login --auth-service microsoft <email>` run is started (the user
    /// completes the Microsoft flow in their browser) and the cache is
    /// read again once it exits.
    ///
    /// A failure to write the login run's log is only logged; the cache is
    /// still read afterwards.
    ///
    /// # Errors
    /// - [`LaunchError::Supervisor`] if the login run couldn't be started.
    /// - [`LaunchError::AuthenticationFailed`] if the login run finished
    ///   without recording a session for `email`.
    pub async fn authenticate(&mut self, email: &str) -> Result<AuthenticatedUser, LaunchError> {
        if let Some(user) = self.select_cached(email) {
            tracing::info!(email = %user.email, username = %user.username, "using cached session");
            return Ok(user);
        }

        let email_safe = redact(email);
        tracing::info!(email = %email_safe, "no cached session, logging in");

        let args = ["login", "--auth-service", "microsoft", email].map(String::from);
        self.run_launcher(&args, RunKind::Auth).await?;

        match self.select_cached(email) {
            Some(user) => {
                tracing::info!(email = %user.email, username = %user.username, "logged in");
                Ok(user)
            }
            None => Err(LaunchError::AuthenticationFailed { email: email_safe }),
        }
    }

    /// Logs `email` out through the launcher and clears the current user.
    ///
    /// The current user is cleared even when the run fails.
    pub async fn logout(&mut self, email: &str) -> Result<(), LaunchError> {
        let args = ["logout", "--auth-service", "microsoft", email].map(String::from);
        let result = self.run_launcher(&args, RunKind::Auth).await;
        self.store.invalidate_current();
        result?;

        tracing::info!(email = %redact(email), "logged out");
        Ok(())
    }

    /// Every user the launcher has a cached session for.
    ///
    /// An unreadable cache yields an empty list.
    pub fn authed_users(&self) -> impl Iterator<Item = AuthedUserEntry> + '_ {
        self.store.list_all()
    }

    /// Installs and, unless `install_only`, starts the game.
    ///
    /// Returns `Ok(true)` if the game ran and exited without a crash,
    /// `Ok(false)` if it crashed, or if the request was refused (unknown
    /// loader or version) before anything was started.
    ///
    /// The version manifest is refreshed with a `search` run first if it
    /// isn't on disk yet. When a user is selected, the game is started
    /// logged in as them.
    ///
    /// # Errors
    /// - [`LaunchError::Supervisor`] if a run couldn't be started. Runs that
    ///   finished but couldn't be fully logged are not errors.
    /// - [`LaunchError::Manifest`] if the manifest is unreadable even
    ///   after the refresh.
    pub async fn launch_game(
        &self,
        options: LaunchOptions,
        install_only: bool,
    ) -> Result<bool, LaunchError> {
        let loader_name = options.loader.as_deref().unwrap_or(Loader::Standard.as_str());
        let loader = match loader_name.parse::<Loader>() {
            Ok(loader) => loader,
            Err(e) => {
                tracing::warn!(error = %e, "refusing launch");
                return Ok(false);
            }
        };

        let manifest_path = self.config.manifest_file();
        if !manifest_path.is_file() {
            tracing::info!("version manifest missing, refreshing");
            self.run_launcher(&["search".to_string()], RunKind::Other).await?;
        }
        let manifest = VersionManifest::load(&manifest_path)?;

        let requested = options.version.as_deref().unwrap_or(DEFAULT_VERSION);
        let version = manifest.resolve(requested);
        if !manifest.contains(version) {
            tracing::warn!(version = %version, "refusing launch: unknown version");
            return Ok(false);
        }

        let mut args = vec!["start".to_string(), format!("{loader}:{version}")];
        if install_only {
            args.push("--dry".to_string());
        }
        if let Some(email) = self.store.current_email() {
            args.push("-l".to_string());
            args.push(email.to_string());
        }

        tracing::info!(%loader, %version, install_only, "launching");
        let outcome = self.run_launcher(&args, RunKind::Game).await?;
        Ok(outcome.quit_cleanly)
    }

    /// Runs the launcher once.
    ///
    /// A run whose only problem was its log still finished: the failure is
    /// logged and the outcome is used as if the log were complete.
    async fn run_launcher(
        &self,
        args: &[String],
        kind: RunKind,
    ) -> Result<RunOutcome, LaunchError> {
        match self.runner.run(args, kind).await {
            Ok(outcome) => Ok(outcome),
            Err(SupervisorError::LogWrite { outcome, source }) => {
                tracing::warn!(%kind, error = %source, "run finished with an incomplete log");
                Ok(*outcome)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Selects the cached session for `email`, if there is one.
    fn select_cached(&mut self, email: &str) -> Option<AuthenticatedUser> {
        match self.store.lookup(email) {
            Ok(Some(record)) => Some(self.store.select(&record)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "session cache unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_parses_allow_list() {
        for loader in Loader::ALL {
            assert_eq!(loader.as_str().parse::<Loader>(), Ok(loader));
        }
    }

    #[test]
    fn test_loader_rejects_unknown_and_wrong_case() {
        assert!("bogus".parse::<Loader>().is_err());
        assert!("Forge".parse::<Loader>().is_err());
        assert!("".parse::<Loader>().is_err());
    }

    #[test]
    fn test_loader_serde_names_match_cli_names() {
        for loader in Loader::ALL {
            let json = serde_json::to_string(&loader).expect("should serialize");
            assert_eq!(json, format!("\"{}\"", loader.as_str()));
        }
    }

    #[test]
    fn test_launch_options_default_is_empty() {
        let options: LaunchOptions = serde_json::from_str("{}").expect("should parse");
        assert_eq!(options, LaunchOptions::default());
    }
}
