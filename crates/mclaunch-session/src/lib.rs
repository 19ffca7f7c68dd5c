//! Authenticated-session cache for mclaunch.
//!
//! The launcher itself performs Microsoft authentication and writes the
//! result to `portablemc_auth.json` in its main directory. This crate reads
//! that document so we can skip the interactive login when a user is
//! already known:
//!
//! 1. **Redaction**: masking emails for display and diagnostics ([`redact`])
//! 2. **Lookup**: finding a cached identity by email ([`SessionStore::lookup`])
//! 3. **Listing**: every cached identity ([`SessionStore::list_all`])
//! 4. **Selection**: the in-memory "current user" ([`SessionStore::select`],
//!    [`SessionStore::invalidate_current`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Launcher (above)  ← decides whether a login run is needed
//!     ↕
//! Session Layer (this crate)  ← reads the launcher's auth document
//!     ↕
//! portablemc_auth.json (below)  ← written only by the external launcher
//! ```

mod error;
mod redact;
mod session;
mod store;

pub use error::StoreError;
pub use redact::redact;
pub use session::{AuthenticatedUser, AuthedUserEntry, SessionRecord};
pub use store::{AUTH_FILE_NAME, SessionStore};
