//! Error types for the mclaunch meta-crate.

use std::path::PathBuf;

use mclaunch_log::LogError;
use mclaunch_process::SupervisorError;
use mclaunch_session::StoreError;

/// Problems found while building a [`LauncherConfig`](crate::LauncherConfig).
///
/// All of these are fatal at startup: there is no point running anything
/// without an executable or somewhere to put the logs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The launcher executable doesn't exist at the configured (or
    /// discovered) location.
    #[error("portablemc not found at {0}")]
    ExecutableNotFound(PathBuf),

    /// No value was given and this platform has no default for it.
    #[error("no default {0} on this platform; set it explicitly")]
    NoDefault(&'static str),

    /// The log directories could not be created.
    #[error("failed to prepare log directories: {0}")]
    LogDirectory(#[source] LogError),
}

/// The version manifest could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file is missing or unreadable, even after a refresh.
    #[error("failed to read version manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest isn't valid JSON of the expected shape.
    #[error("failed to parse version manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Configuration was invalid (startup only).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A launcher run could not be started, or its live log could not be
    /// opened.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// The session cache was unreadable.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The version manifest was unreadable.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The login run finished but no session was recorded for the email.
    /// `email` is redacted.
    #[error("authentication failed for {email}: no session recorded after login")]
    AuthenticationFailed { email: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::ExecutableNotFound(PathBuf::from("/nope/portablemc"));
        let launch_err: LaunchError = err.into();
        assert!(matches!(launch_err, LaunchError::Config(_)));
        assert!(launch_err.to_string().contains("/nope/portablemc"));
    }

    #[test]
    fn test_from_supervisor_error() {
        let err = SupervisorError::Pipe("stdout");
        let launch_err: LaunchError = err.into();
        assert!(matches!(launch_err, LaunchError::Supervisor(_)));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::Unavailable {
            path: PathBuf::from("auth.json"),
            reason: "missing".into(),
        };
        let launch_err: LaunchError = err.into();
        assert!(matches!(launch_err, LaunchError::Store(_)));
    }

    #[test]
    fn test_authentication_failed_message_uses_given_email() {
        let err = LaunchError::AuthenticationFailed {
            email: "abc***@xample.com".into(),
        };
        assert!(err.to_string().contains("abc***@xample.com"));
    }
}
