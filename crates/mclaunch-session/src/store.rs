//! The session store: read access to the launcher's auth document.
//!
//! # Concurrency note
//!
//! The document belongs to the external launcher, which may rewrite it at
//! any time (a `login` run finishing, a token refresh). The store therefore
//! keeps nothing from it in memory: every call re-reads the file, and a
//! read that fails half-way through someone else's write is reported as
//! [`StoreError::Unavailable`], which callers treat as "not found".

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AuthenticatedUser, AuthedUserEntry, SessionRecord, StoreError, redact};

/// File name of the auth document inside the launcher's main directory.
pub const AUTH_FILE_NAME: &str = "portablemc_auth.json";

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

// { "microsoft": { "sessions": { "<email>": { "username": …, "uuid": …, … } } } }
//
// Only the fields we read are modelled; serde ignores the rest (tokens,
// expiry times, other providers). Sessions are parsed one by one, so a
// single malformed entry doesn't hide the others.

#[derive(Debug, Default, Deserialize)]
struct AuthDocument {
    #[serde(default)]
    microsoft: Option<ProviderSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSection {
    #[serde(default)]
    sessions: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StoredSession {
    username: String,
    uuid: String,
}

impl StoredSession {
    /// Parses one entry of the sessions map, skipping it if malformed.
    fn parse(email: &str, value: serde_json::Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(email = %redact(email), error = %e, "skipping malformed session");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Reads cached identities and tracks the currently selected user.
///
/// ## Lifecycle of the current user
///
/// ```text
///   (none) ──select()──→ Some(user) ──invalidate_current()──→ (none)
/// ```
///
/// The current user lives only in memory. Logging out clears it here;
/// deleting the persisted session is the launcher's job.
#[derive(Debug)]
pub struct SessionStore {
    /// Full path to `portablemc_auth.json`.
    path: PathBuf,

    /// The selected user: raw email (needed for `start -l <email>`) and
    /// the display-safe projection.
    current: Option<(String, AuthenticatedUser)>,
}

impl SessionStore {
    /// Creates a store reading `<main_dir>/portablemc_auth.json`.
    pub fn new(main_dir: &Path) -> Self {
        Self {
            path: main_dir.join(AUTH_FILE_NAME),
            current: None,
        }
    }

    /// Path of the auth document this store reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up the cached session for `email`.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the document is missing or
    /// malformed. A readable document without the provider section, without
    /// this email, or with a malformed entry for it is `Ok(None)`.
    pub fn lookup(&self, email: &str) -> Result<Option<SessionRecord>, StoreError> {
        let document = self.read_document()?;
        let record = document
            .microsoft
            .and_then(|mut provider| provider.sessions.remove(email))
            .and_then(|value| StoredSession::parse(email, value))
            .map(|stored| SessionRecord {
                email: email.to_string(),
                username: stored.username,
                uuid: stored.uuid,
            });

        tracing::debug!(
            email = %redact(email),
            found = record.is_some(),
            "session lookup"
        );
        Ok(record)
    }

    /// Lists every cached session, ordered by email.
    ///
    /// The document is read once, when this is called; the returned
    /// iterator does not see later changes. Absence (no file, broken
    /// file, no provider section) is a normal state and yields an empty
    /// iterator.
    pub fn list_all(&self) -> impl Iterator<Item = AuthedUserEntry> {
        let sessions = match self.read_document() {
            Ok(document) => document
                .microsoft
                .map(|provider| provider.sessions)
                .unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "no sessions to list");
                BTreeMap::new()
            }
        };

        sessions.into_iter().filter_map(|(email, value)| {
            let stored = StoredSession::parse(&email, value)?;
            Some(AuthedUserEntry::from(SessionRecord {
                email,
                username: stored.username,
                uuid: stored.uuid,
            }))
        })
    }

    /// Makes `record` the current user and returns its display projection.
    pub fn select(&mut self, record: &SessionRecord) -> AuthenticatedUser {
        let user = AuthenticatedUser::from(record);
        tracing::info!(email = %user.email, username = %user.username, "user selected");
        self.current = Some((record.email.clone(), user.clone()));
        user
    }

    /// The currently selected user, if any.
    pub fn current(&self) -> Option<&AuthenticatedUser> {
        self.current.as_ref().map(|(_, user)| user)
    }

    /// The raw email of the currently selected user, if any.
    pub fn current_email(&self) -> Option<&str> {
        self.current.as_ref().map(|(email, _)| email.as_str())
    }

    /// Forgets the current user. The persisted document is not touched.
    pub fn invalidate_current(&mut self) {
        if let Some((_, user)) = self.current.take() {
            tracing::info!(email = %user.email, "current user cleared");
        }
    }

    fn read_document(&self) -> Result<AuthDocument, StoreError> {
        let unavailable = |reason: String| StoreError::Unavailable {
            path: self.path.clone(),
            reason,
        };

        let raw = fs::read_to_string(&self.path).map_err(|e| unavailable(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| unavailable(e.to_string()))
    }
}

// =========================================================================
// Tests
// =========================================================================
