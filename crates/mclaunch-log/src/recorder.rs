//! The recorder: live log writing and rotation.
//!
//! [`SessionLogRecorder`] knows where logs live. [`LiveLog`] is the open
//! `latest.log` of one run. Rotation consumes the `LiveLog`, so the type
//! system guarantees a run is rotated at most once and never written to
//! afterwards.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mclaunch_output::{ClassifiedLine, Marker, RunKind};
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::LogError;

/// File name of the live log inside each kind's directory.
pub const LIVE_LOG_NAME: &str = "latest.log";

// ---------------------------------------------------------------------------
// SessionLogRecorder
// ---------------------------------------------------------------------------

/// Owns the log root and hands out live logs per [`RunKind`].
///
/// Cheap to clone (it's just a path). Opening a live log truncates it, so
/// callers must not open the same kind twice at once: two writers would
/// interleave their lines in one file.
#[derive(Debug, Clone)]
pub struct SessionLogRecorder {
    root: PathBuf,
}

impl SessionLogRecorder {
    /// Creates a recorder rooted at `root`. Nothing is touched on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The log root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding live and rotated logs for `kind`.
    pub fn kind_dir(&self, kind: RunKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Path of the live log for `kind`.
    pub fn live_log_path(&self, kind: RunKind) -> PathBuf {
        self.kind_dir(kind).join(LIVE_LOG_NAME)
    }

    /// Creates `<root>/{auth,game,other}` if they don't exist.
    ///
    /// Called once at startup by the configuration layer.
    pub fn ensure_dirs(&self) -> Result<(), LogError> {
        for kind in RunKind::ALL {
            let dir = self.kind_dir(kind);
            std::fs::create_dir_all(&dir).map_err(|source| LogError::Write {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Opens (creating or truncating) the live log for a new run of `kind`.
    pub async fn open(&self, kind: RunKind) -> Result<LiveLog, LogError> {
        let dir = self.kind_dir(kind);
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| LogError::Write {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(LIVE_LOG_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|source| LogError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(%kind, path = %path.display(), "live log opened");
        Ok(LiveLog {
            kind,
            dir,
            path,
            file,
            written: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// LiveLog
// ---------------------------------------------------------------------------

/// The open `latest.log` of one run.
///
/// Every append is written and flushed before it returns, so the file on
/// disk always reflects everything the run has printed so far.
#[derive(Debug)]
pub struct LiveLog {
    kind: RunKind,
    dir: PathBuf,
    path: PathBuf,
    file: File,
    /// Bytes this run has successfully written and flushed.
    written: u64,
}

impl LiveLog {
    /// The kind of run this log belongs to.
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Path of the live log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends classified lines in order. Each line's markers are written
    /// on their own lines right before its text.
    pub async fn append(&mut self, lines: &[ClassifiedLine]) -> Result<(), LogError> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for line in lines {
            for marker in &line.markers {
                buf.push_str(marker.as_str());
                buf.push('\n');
            }
            buf.push_str(&line.text);
            buf.push('\n');
        }
        self.write(buf.as_bytes()).await
    }

    /// Appends synthetic markers, one per line.
    pub async fn append_markers(&mut self, markers: &[Marker]) -> Result<(), LogError> {
        let mut buf = String::new();
        for marker in markers {
            buf.push_str(marker.as_str());
            buf.push('\n');
        }
        self.write(buf.as_bytes()).await
    }

    /// Copies the live log into a new artifact named after `exit_timestamp`
    /// and truncates the live log to empty.
    ///
    /// Returns the artifact path. If an artifact with that name already
    /// exists (two runs ending in the same second), a `-1`, `-2`, …
    /// suffix is added rather than overwriting it.
    pub async fn rotate(mut self, exit_timestamp: OffsetDateTime) -> Result<PathBuf, LogError> {
        self.file.flush().await.map_err(|source| LogError::Write {
            path: self.path.clone(),
            source,
        })?;

        // Only what this run wrote. Reading to EOF would never finish if
        // `latest.log` were replaced by a device.
        let read_error = |source| LogError::Read {
            path: self.path.clone(),
            source,
        };
        let mut contents = Vec::new();
        File::open(&self.path)
            .await
            .map_err(read_error)?
            .take(self.written)
            .read_to_end(&mut contents)
            .await
            .map_err(read_error)?;

        let stem = artifact_stem(exit_timestamp)?;
        let artifact = write_new_artifact(&self.dir, &stem, &contents).await?;

        self.file.set_len(0).await.map_err(|source| LogError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            kind = %self.kind,
            artifact = %artifact.display(),
            bytes = contents.len(),
            "log rotated"
        );
        Ok(artifact)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), LogError> {
        // tokio's `File` hands writes to a blocking thread; `flush` waits
        // for that write to land before we report success.
        self.file.write_all(bytes).await.map_err(|source| LogError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.file.flush().await.map_err(|source| LogError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

/// The artifact file stem for a run that ended at `timestamp`.
///
/// Format: `YYYY-MM-DDTHH;MM;SS` in UTC, the first 19 characters of an
/// ISO-8601 timestamp with colons replaced by semicolons.
pub fn artifact_stem(timestamp: OffsetDateTime) -> Result<String, LogError> {
    let utc = timestamp.to_offset(time::UtcOffset::UTC);
    Ok(utc.format(format_description!(
        "[year]-[month]-[day]T[hour];[minute];[second]"
    ))?)
}

async fn write_new_artifact(
    dir: &Path,
    stem: &str,
    contents: &[u8],
) -> Result<PathBuf, LogError> {
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("{stem}.log")
        } else {
            format!("{stem}-{suffix}.log")
        };
        let path = dir.join(name);

        // `create_new` fails if the file exists, which makes the
        // "does it exist?" check and the create a single step.
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(mut file) => {
                file.write_all(contents).await.map_err(|source| LogError::Write {
                    path: path.clone(),
                    source,
                })?;
                file.flush().await.map_err(|source| LogError::Write {
                    path: path.clone(),
                    source,
                })?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(source) => return Err(LogError::Write { path, source }),
        }
    }
}
