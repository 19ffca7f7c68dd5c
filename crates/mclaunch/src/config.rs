//! Launcher configuration and its builder.
//!
//! Three locations drive everything:
//!
//! | Setting        | Default (Linux)             | Default (Windows)                                   |
//! |----------------|-----------------------------|-----------------------------------------------------|
//! | `exe_location` | `~/.local/bin/portablemc`   | `%APPDATA%\Python\<ver>\Scripts\portablemc.exe`     |
//! | `main_dir`     | `~/.minecraft`              | `%APPDATA%\.minecraft`                              |
//! | `log_location` | `./logs`                    | `./logs`                                            |
//!
//! On other platforms the first two have no default and must be set.

use std::path::{Path, PathBuf};

use mclaunch_log::SessionLogRecorder;
use mclaunch_session::AUTH_FILE_NAME;

use crate::{ConfigError, MANIFEST_FILE_NAME};

/// Default root for run logs, relative to the working directory.
pub const DEFAULT_LOG_LOCATION: &str = "logs";

/// Resolved, validated configuration.
///
/// Only obtainable through [`LauncherConfigBuilder::build`], so holding one
/// means the executable existed and the log directories were created.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    exe_location: PathBuf,
    log_location: PathBuf,
    main_dir: PathBuf,
}

impl LauncherConfig {
    /// Creates a new builder.
    pub fn builder() -> LauncherConfigBuilder {
        LauncherConfigBuilder::new()
    }

    /// Path of the `portablemc` executable.
    pub fn exe_location(&self) -> &Path {
        &self.exe_location
    }

    /// Root of the per-kind log directories.
    pub fn log_location(&self) -> &Path {
        &self.log_location
    }

    /// The launcher's main (game) directory.
    pub fn main_dir(&self) -> &Path {
        &self.main_dir
    }

    /// `<main_dir>/portablemc_auth.json`
    pub fn auth_file(&self) -> PathBuf {
        self.main_dir.join(AUTH_FILE_NAME)
    }

    /// `<main_dir>/portablemc_version_manifest.json`
    pub fn manifest_file(&self) -> PathBuf {
        self.main_dir.join(MANIFEST_FILE_NAME)
    }
}

/// Builder for [`LauncherConfig`].
///
/// Unset values fall back to the platform defaults listed in the module
/// docs.
///
/// ```rust,no_run
/// use mclaunch::LauncherConfig;
///
/// let config = LauncherConfig::builder()
///     .exe_location("/opt/portablemc/bin/portablemc")
///     .main_dir("/srv/minecraft")
///     .build()
///     .expect("valid config");
/// ```
#[derive(Debug, Default)]
pub struct LauncherConfigBuilder {
    exe_location: Option<PathBuf>,
    log_location: Option<PathBuf>,
    main_dir: Option<PathBuf>,
}

impl LauncherConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path of the `portablemc` executable.
    pub fn exe_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.exe_location = Some(path.into());
        self
    }

    /// Sets the root directory for run logs.
    pub fn log_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_location = Some(path.into());
        self
    }

    /// Sets the launcher's main directory.
    pub fn main_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.main_dir = Some(path.into());
        self
    }

    /// Resolves defaults, validates, and creates the log directories.
    ///
    /// # Errors
    /// - [`ConfigError::NoDefault`] if a location is unset and the platform
    ///   has no default for it.
    /// - [`ConfigError::ExecutableNotFound`] if the executable is missing.
    /// - [`ConfigError::LogDirectory`] if `<log_location>/{auth,game,other}`
    ///   can't be created.
    pub fn build(self) -> Result<LauncherConfig, ConfigError> {
        let exe_location = self
            .exe_location
            .or_else(default_exe_location)
            .ok_or(ConfigError::NoDefault("executable location"))?;
        if !exe_location.is_file() {
            return Err(ConfigError::ExecutableNotFound(exe_location));
        }

        let main_dir = self
            .main_dir
            .or_else(default_main_dir)
            .ok_or(ConfigError::NoDefault("main directory"))?;

        let log_location = self
            .log_location
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_LOCATION));
        SessionLogRecorder::new(&log_location)
            .ensure_dirs()
            .map_err(ConfigError::LogDirectory)?;

        tracing::debug!(
            exe = %exe_location.display(),
            main_dir = %main_dir.display(),
            logs = %log_location.display(),
            "launcher configured"
        );

        Ok(LauncherConfig {
            exe_location,
            log_location,
            main_dir,
        })
    }
}

// ---------------------------------------------------------------------------
// Platform defaults
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
fn default_exe_location() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".local").join("bin").join("portablemc"))
}

/// pip installs into `%APPDATA%\Python\Python3xx\Scripts`; when several
/// interpreters are present the highest-named one wins.
#[cfg(windows)]
fn default_exe_location() -> Option<PathBuf> {
    let python = dirs::data_dir()?.join("Python");
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(python)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path().join("Scripts").join("portablemc.exe"))
        .collect();
    candidates.sort();
    candidates.into_iter().rev().find(|path| path.is_file())
}

#[cfg(not(any(target_os = "linux", windows)))]
fn default_exe_location() -> Option<PathBuf> {
    None
}

#[cfg(target_os = "linux")]
fn default_main_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".minecraft"))
}

#[cfg(windows)]
fn default_main_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|appdata| appdata.join(".minecraft"))
}

#[cfg(not(any(target_os = "linux", windows)))]
fn default_main_dir() -> Option<PathBuf> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_exe(dir: &tempfile::TempDir) -> PathBuf {
        let exe = dir.path().join("portablemc");
        std::fs::write(&exe, "").expect("write fake exe");
        exe
    }

    #[test]
    fn test_build_with_explicit_paths_creates_log_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");

        let config = LauncherConfig::builder()
            .exe_location(fake_exe(&dir))
            .log_location(&logs)
            .main_dir(dir.path().join(".minecraft"))
            .build()
            .expect("should succeed");

        assert_eq!(config.log_location(), logs);
        for kind in ["auth", "game", "other"] {
            assert!(logs.join(kind).is_dir(), "{kind} dir missing");
        }
    }

    #[test]
    fn test_build_missing_executable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = LauncherConfig::builder()
            .exe_location(&missing)
            .log_location(dir.path().join("logs"))
            .main_dir(dir.path())
            .build();

        assert!(matches!(result, Err(ConfigError::ExecutableNotFound(p)) if p == missing));
    }

    #[test]
    fn test_build_directory_as_executable_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = LauncherConfig::builder()
            .exe_location(dir.path())
            .log_location(dir.path().join("logs"))
            .main_dir(dir.path())
            .build();

        assert!(matches!(result, Err(ConfigError::ExecutableNotFound(_))));
    }

    #[test]
    fn test_build_log_location_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a dir").unwrap();

        let result = LauncherConfig::builder()
            .exe_location(fake_exe(&dir))
            .log_location(&blocker)
            .main_dir(dir.path())
            .build();

        assert!(matches!(result, Err(ConfigError::LogDirectory(_))));
    }

    #[test]
    fn test_main_dir_file_paths() {
        let dir = tempfile::tempdir().unwrap();
        let main_dir = dir.path().join(".minecraft");

        let config = LauncherConfig::builder()
            .exe_location(fake_exe(&dir))
            .log_location(dir.path().join("logs"))
            .main_dir(&main_dir)
            .build()
            .expect("should succeed");

        assert_eq!(config.auth_file(), main_dir.join("portablemc_auth.json"));
        assert_eq!(
            config.manifest_file(),
            main_dir.join("portablemc_version_manifest.json")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_defaults_live_under_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            default_exe_location(),
            Some(home.join(".local/bin/portablemc"))
        );
        assert_eq!(default_main_dir(), Some(home.join(".minecraft")));
    }
}
