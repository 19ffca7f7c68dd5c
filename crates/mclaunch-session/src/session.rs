//! Session types: the identities the store hands out.
//!
//! - [`SessionRecord`]: what the launcher persisted for one email.
//! - [`AuthedUserEntry`]: a record as shown in a user list.
//! - [`AuthenticatedUser`]: the currently selected user, safe to display.

use serde::Serialize;

use crate::redact;

/// A persisted identity, keyed by email.
///
/// Created and updated only by the external launcher's `login` command.
/// From our side it is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// The account email (the unique key in the document).
    pub email: String,
    /// The in-game player name.
    pub username: String,
    /// The player's profile UUID.
    pub uuid: String,
}

/// One row of [`SessionStore::list_all`](crate::SessionStore::list_all).
///
/// Carries both the raw and the redacted email: the raw one is needed to
/// authenticate as that user, the redacted one is what a UI should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthedUserEntry {
    pub email_safe: String,
    pub email: String,
    pub username: String,
    pub uuid: String,
}

impl From<SessionRecord> for AuthedUserEntry {
    fn from(record: SessionRecord) -> Self {
        Self {
            email_safe: redact(&record.email),
            email: record.email,
            username: record.username,
            uuid: record.uuid,
        }
    }
}

/// The user selected for this process lifetime.
///
/// Derived from a [`SessionRecord`], never persisted. Only the redacted
/// email is exposed, so the value can be logged or shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub uuid: String,
    /// The redacted form of the account email.
    pub email: String,
}

impl From<&SessionRecord> for AuthenticatedUser {
    fn from(record: &SessionRecord) -> Self {
        Self {
            username: record.username.clone(),
            uuid: record.uuid.clone(),
            email: redact(&record.email),
        }
    }
}
