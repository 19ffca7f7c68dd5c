//! Error types for the session layer.

use std::path::PathBuf;

/// Errors that can occur while reading the launcher's auth document.
///
/// There is only one: the document can't be used. Callers are expected to
/// treat this as "nobody is authenticated yet", not as a crash.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The auth document is missing, unreadable, or not valid JSON of the
    /// expected shape.
    #[error("session store unavailable at {path}: {reason}")]
    Unavailable {
        /// Where we looked for the document.
        path: PathBuf,
        /// What went wrong (I/O or parse error text).
        reason: String,
    },
}
