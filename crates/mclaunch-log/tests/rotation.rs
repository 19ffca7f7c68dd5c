//! Integration tests for live log writing and rotation.
//!
//! Every test gets its own temporary log root, so the real filesystem is
//! exercised without tests interfering with each other.

use mclaunch_log::{LIVE_LOG_NAME, SessionLogRecorder};
use mclaunch_output::{ClassifiedLine, Marker, Phase, RunKind};
use time::macros::datetime;

// =========================================================================
// Helpers
// =========================================================================

fn line(text: &str) -> ClassifiedLine {
    ClassifiedLine {
        text: text.to_string(),
        phase: Phase::Boot,
        markers: Vec::new(),
        crashed: false,
    }
}

fn recorder() -> (tempfile::TempDir, SessionLogRecorder) {
    let dir = tempfile::tempdir().expect("tempdir");
    let recorder = SessionLogRecorder::new(dir.path());
    (dir, recorder)
}

// =========================================================================
// Appending
// =========================================================================

#[tokio::test]
async fn test_append_writes_markers_before_line_text() {
    let (_dir, recorder) = recorder();
    let mut live = recorder.open(RunKind::Game).await.expect("open");

    live.append_markers(&Marker::start_sequence()).await.unwrap();
    live.append(&[
        line("Installing"),
        ClassifiedLine {
            text: "[10:00:00] hello".into(),
            phase: Phase::Game,
            markers: vec![Marker::BootEnd, Marker::GameStart],
            crashed: false,
        },
    ])
    .await
    .unwrap();

    let contents = std::fs::read_to_string(live.path()).unwrap();
    assert_eq!(
        contents,
        "PROGRAMSTART\nBOOTSTART\nInstalling\nBOOTEND\nGAMESTART\n[10:00:00] hello\n"
    );
}

#[tokio::test]
async fn test_open_truncates_previous_live_log() {
    let (_dir, recorder) = recorder();
    let mut first = recorder.open(RunKind::Auth).await.unwrap();
    first.append(&[line("stale")]).await.unwrap();
    drop(first);

    let second = recorder.open(RunKind::Auth).await.unwrap();

    let contents = std::fs::read_to_string(second.path()).unwrap();
    assert!(contents.is_empty(), "a new run starts with an empty live log");
}

// =========================================================================
// Rotation
// =========================================================================

#[tokio::test]
async fn test_rotate_copies_content_and_empties_live_log() {
    let (_dir, recorder) = recorder();
    let mut live = recorder.open(RunKind::Other).await.unwrap();
    live.append(&[line("X"), line("Y")]).await.unwrap();
    let live_path = live.path().to_path_buf();

    let artifact = live
        .rotate(datetime!(2026-10-17 05:49:00 UTC))
        .await
        .expect("rotate");

    assert_eq!(
        artifact,
        recorder.kind_dir(RunKind::Other).join("2026-10-17T05;49;00.log")
    );
    assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "X\nY\n");
    assert_eq!(std::fs::read_to_string(&live_path).unwrap(), "");
    assert!(live_path.ends_with(LIVE_LOG_NAME));
}

#[tokio::test]
async fn test_rotate_same_second_does_not_overwrite() {
    let (_dir, recorder) = recorder();
    let at = datetime!(2026-10-17 05:49:00 UTC);

    let mut first = recorder.open(RunKind::Game).await.unwrap();
    first.append(&[line("first run")]).await.unwrap();
    let first_artifact = first.rotate(at).await.unwrap();

    let mut second = recorder.open(RunKind::Game).await.unwrap();
    second.append(&[line("second run")]).await.unwrap();
    let second_artifact = second.rotate(at).await.unwrap();

    assert_ne!(first_artifact, second_artifact);
    assert!(second_artifact.ends_with("2026-10-17T05;49;00-1.log"));
    assert_eq!(std::fs::read_to_string(first_artifact).unwrap(), "first run\n");
    assert_eq!(std::fs::read_to_string(second_artifact).unwrap(), "second run\n");
}

#[tokio::test]
async fn test_rotate_copies_only_bytes_this_run_wrote() {
    use std::io::Write;

    let (_dir, recorder) = recorder();
    let mut live = recorder.open(RunKind::Auth).await.unwrap();
    live.append(&[line("ours")]).await.unwrap();

    // Someone else appends behind our back.
    let mut other = std::fs::OpenOptions::new()
        .append(true)
        .open(live.path())
        .unwrap();
    other.write_all(b"not ours\n").unwrap();

    let artifact = live
        .rotate(datetime!(2026-10-17 06:00:00 UTC))
        .await
        .expect("rotate");

    assert_eq!(std::fs::read_to_string(artifact).unwrap(), "ours\n");
}

#[tokio::test]
async fn test_open_fails_when_root_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let recorder = SessionLogRecorder::new(&blocker);

    let result = recorder.open(RunKind::Game).await;

    assert!(matches!(result, Err(mclaunch_log::LogError::Write { .. })));
}
