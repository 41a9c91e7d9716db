//! Pipeline lifecycle integration tests.
//!
//! These tests verify the controller with mock drivers:
//! - Stage ordering and progress monotonicity
//! - Exactly one terminal event per session, nothing after it
//! - Working directory cleanup on success and failure
//! - Publish-target collision rejection

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use isoforge_core::{
    converter::ConverterError,
    downloader::DownloaderError,
    pipeline::{PipelineConfig, PipelineController, PipelineError},
    placer::{FsPlacer, PlacerConfig, PlacerError},
    progress::{Stage, WireEvent},
    testing::{fixtures, MockConverter, MockDownloader, MockPlacer},
    UpdateManifest,
};

/// Test helper wiring a controller to mock drivers and temp roots.
struct TestHarness {
    controller: PipelineController<MockDownloader, MockConverter, FsPlacer>,
    downloader: MockDownloader,
    converter: MockConverter,
    scratch: TempDir,
    publish: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    fn with_config(mut config: PipelineConfig) -> Self {
        isoforge_core::testing::init_test_logging();

        let scratch = TempDir::new().expect("Failed to create scratch dir");
        let publish = TempDir::new().expect("Failed to create publish dir");

        config.scratch_root = scratch.path().to_path_buf();

        let downloader = MockDownloader::new();
        let converter = MockConverter::new();
        let placer = FsPlacer::new(
            PlacerConfig::default().with_publish_root(publish.path().to_path_buf()),
        );

        let controller = PipelineController::new(
            config,
            downloader.clone(),
            converter.clone(),
            placer,
        );

        Self {
            controller,
            downloader,
            converter,
            scratch,
            publish,
        }
    }

    fn scratch_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch.path())
            .expect("Failed to read scratch root")
            .map(|e| e.expect("Failed to read scratch entry").path())
            .collect()
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<WireEvent>) -> Vec<WireEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Asserts the session-wide wire invariants: monotonic progress and exactly
/// one terminal event with nothing after it.
fn assert_wire_invariants(events: &[WireEvent]) {
    let mut last_progress = 0.0f32;
    let mut terminal_seen = false;

    for event in events {
        assert!(!terminal_seen, "event observed after terminal: {:?}", event);
        match event {
            WireEvent::Progress { progress, .. } => {
                assert!(
                    *progress >= last_progress,
                    "progress regressed from {} to {}",
                    last_progress,
                    progress
                );
                last_progress = *progress;
            }
            WireEvent::Complete { .. } | WireEvent::Error { .. } => {
                terminal_seen = true;
            }
        }
    }

    assert!(terminal_seen, "no terminal event observed");
}

fn stages(events: &[WireEvent]) -> Vec<Stage> {
    events
        .iter()
        .filter_map(|e| match e {
            WireEvent::Progress { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn test_successful_session_end_to_end() {
    let harness = TestHarness::new();
    let manifest = fixtures::valid_manifest("Feature Update 26100.1 amd64");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let artifact = harness.controller.run(manifest, tx).await.unwrap();

    assert_eq!(artifact.filename, "Feature_Update_26100.1_amd64.iso");
    assert_eq!(
        artifact.path,
        harness.publish.path().join("Feature_Update_26100.1_amd64.iso")
    );
    assert!(artifact.path.exists());
    assert_eq!(artifact.size_bytes, 19); // b"mock image contents"

    let events = drain(&mut rx);
    assert_wire_invariants(&events);

    // Stage order: init, download, convert, move, then the complete event.
    let observed = stages(&events);
    let last_init = observed.iter().rposition(|s| *s == Stage::Init).unwrap();
    let first_download = observed.iter().position(|s| *s == Stage::Download).unwrap();
    let last_download = observed.iter().rposition(|s| *s == Stage::Download).unwrap();
    let first_convert = observed.iter().position(|s| *s == Stage::Convert).unwrap();
    let last_convert = observed.iter().rposition(|s| *s == Stage::Convert).unwrap();
    let first_move = observed.iter().position(|s| *s == Stage::Move).unwrap();
    assert!(last_init < first_download);
    assert!(last_download < first_convert);
    assert!(last_convert < first_move);

    match events.last().unwrap() {
        WireEvent::Complete { filename, path, .. } => {
            assert_eq!(filename, "Feature_Update_26100.1_amd64.iso");
            assert_eq!(*path, artifact.path);
        }
        other => panic!("expected complete event, got {:?}", other),
    }

    // First event opens the session at progress 0.
    match &events[0] {
        WireEvent::Progress { stage, progress, .. } => {
            assert_eq!(*stage, Stage::Init);
            assert_eq!(*progress, 0.0);
        }
        other => panic!("expected init event, got {:?}", other),
    }

    // Working directory is discarded after the artifact is extracted.
    assert!(harness.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_download_progress_mapping_observed_on_wire() {
    let harness = TestHarness::new();
    harness.downloader.set_progress_script(vec![42]).await;
    let manifest = fixtures::valid_manifest("Mapping Check");
    let (tx, mut rx) = mpsc::unbounded_channel();

    harness.controller.run(manifest, tx).await.unwrap();

    let events = drain(&mut rx);
    let has_mapped_value = events.iter().any(|e| match e {
        WireEvent::Progress { stage, progress, .. } => {
            *stage == Stage::Download && (*progress - 35.2).abs() < 1e-4
        }
        _ => false,
    });
    assert!(has_mapped_value, "expected 42% to map to 35.2 on the wire");
}

#[tokio::test]
async fn test_spawn_returns_immediately_and_completes() {
    let harness = TestHarness::new();
    harness
        .downloader
        .set_fetch_duration(Duration::from_millis(100))
        .await;
    let manifest = fixtures::valid_manifest("Background Build");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = harness.controller.spawn(manifest, tx).unwrap();
    assert_eq!(
        handle.final_path,
        harness.publish.path().join("Background_Build.iso")
    );

    let result = handle.wait().await.expect("session was not cancelled");
    let artifact = result.unwrap();
    assert!(artifact.path.exists());

    let events = drain(&mut rx);
    assert_wire_invariants(&events);
}

#[tokio::test]
async fn test_keep_work_dir_config_preserves_scratch() {
    let harness = TestHarness::with_config(PipelineConfig::default().with_keep_work_dir(true));
    let manifest = fixtures::manifest(
        "Null Url Check",
        &[
            ("good.esd", Some("https://cdn.example.com/good.esd")),
            ("absent.cab", Some("null")),
        ],
    );
    let (tx, _rx) = mpsc::unbounded_channel();

    harness.controller.run(manifest, tx).await.unwrap();

    let entries = harness.scratch_entries();
    assert_eq!(entries.len(), 1, "work dir should be preserved");

    // The rendered input list excludes the "null" url entry.
    let input_list = std::fs::read_to_string(entries[0].join("download_list.txt")).unwrap();
    assert!(input_list.contains("out=good.esd"));
    assert!(!input_list.contains("absent.cab"));
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_download_failure_emits_single_error_and_cleans_up() {
    let harness = TestHarness::new();
    harness
        .downloader
        .set_next_error(DownloaderError::failed(1, Some("server said no".to_string())))
        .await;
    let manifest = fixtures::valid_manifest("Doomed Build");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = harness.controller.run(manifest, tx).await.unwrap_err();
    match &err {
        PipelineError::DownloadFailed { exit_code, .. } => assert_eq!(*exit_code, 1),
        other => panic!("unexpected error: {:?}", other),
    }

    let events = drain(&mut rx);
    assert_wire_invariants(&events);

    match events.last().unwrap() {
        WireEvent::Error { error, details } => {
            assert!(error.contains("exit code 1"));
            assert_eq!(details.as_deref(), Some("server said no"));
        }
        other => panic!("expected error event, got {:?}", other),
    }

    // No convert or move events after the download died.
    assert!(!stages(&events).contains(&Stage::Convert));

    // Working directory no longer exists.
    assert!(harness.scratch_entries().is_empty());

    // Nothing was published.
    assert!(std::fs::read_dir(harness.publish.path())
        .unwrap()
        .next()
        .is_none());
}

#[tokio::test]
async fn test_missing_tool_fails_with_tool_missing() {
    let harness = TestHarness::new();
    harness
        .converter
        .set_next_error(ConverterError::ToolMissing {
            path: PathBuf::from("/usr/local/bin/create-install-iso"),
        })
        .await;
    let manifest = fixtures::valid_manifest("No Tool");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = harness.controller.run(manifest, tx).await.unwrap_err();
    assert!(matches!(err, PipelineError::ToolMissing { .. }));

    let events = drain(&mut rx);
    assert_wire_invariants(&events);
    assert!(harness.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_conversion_without_artifact_fails_with_artifact_not_found() {
    let harness = TestHarness::new();
    harness.converter.set_create_artifact(false).await;
    let manifest = fixtures::valid_manifest("Empty Output");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = harness.controller.run(manifest, tx).await.unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactNotFound));

    let events = drain(&mut rx);
    assert_wire_invariants(&events);
}

#[tokio::test]
async fn test_relocation_failure_maps_to_relocation_failed() {
    let scratch = TempDir::new().unwrap();
    let downloader = MockDownloader::new();
    let converter = MockConverter::new();
    let placer = MockPlacer::new("/published");
    placer
        .set_next_error(PlacerError::move_failed(
            PathBuf::from("/work/a.iso"),
            PathBuf::from("/published/a.iso"),
            std::io::Error::other("disk full"),
        ))
        .await;

    let controller = PipelineController::new(
        PipelineConfig::default().with_scratch_root(scratch.path().to_path_buf()),
        downloader,
        converter,
        placer,
    );
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = controller
        .run(fixtures::valid_manifest("Bad Disk"), tx)
        .await
        .unwrap_err();
    match err {
        PipelineError::RelocationFailed { reason } => {
            assert!(reason.contains("Failed to move artifact"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_wire_invariants(&drain(&mut rx));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_same_target_is_rejected_while_in_flight() {
    let harness = TestHarness::new();
    harness
        .downloader
        .set_fetch_duration(Duration::from_millis(300))
        .await;

    let manifest = fixtures::valid_manifest("Popular Build");
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();

    let handle = harness.controller.spawn(manifest.clone(), tx1).unwrap();

    // Second session for the same update resolves to the same publish path.
    let err = harness.controller.spawn(manifest.clone(), tx2).unwrap_err();
    assert!(matches!(err, PipelineError::PublishPathBusy { .. }));

    // Once the first session finishes, the target frees up.
    handle.wait().await.expect("first session cancelled").unwrap();
    let (tx3, _rx3) = mpsc::unbounded_channel();
    let handle = harness.controller.spawn(manifest, tx3).unwrap();
    handle.wait().await.expect("second session cancelled").unwrap();
}

#[tokio::test]
async fn test_distinct_targets_run_concurrently() {
    let harness = TestHarness::new();
    harness
        .downloader
        .set_fetch_duration(Duration::from_millis(100))
        .await;

    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();

    let a = harness
        .controller
        .spawn(fixtures::valid_manifest("Build A"), tx1)
        .unwrap();
    let b = harness
        .controller
        .spawn(fixtures::valid_manifest("Build B"), tx2)
        .unwrap();

    let (ra, rb) = tokio::join!(a.wait(), b.wait());
    ra.expect("a cancelled").unwrap();
    rb.expect("b cancelled").unwrap();

    assert_wire_invariants(&drain(&mut rx1));
    assert_wire_invariants(&drain(&mut rx2));
    assert_eq!(harness.downloader.fetch_count().await, 2);
    assert_eq!(harness.converter.assemble_count().await, 2);
}

#[tokio::test]
async fn test_cancelled_session_releases_target() {
    let harness = TestHarness::new();
    harness
        .downloader
        .set_fetch_duration(Duration::from_secs(30))
        .await;

    let manifest = fixtures::valid_manifest("Cancelled Build");
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = harness.controller.spawn(manifest.clone(), tx).unwrap();

    handle.cancel();
    // Give the abort a moment to drop the claim.
    tokio::time::sleep(Duration::from_millis(50)).await;

    harness
        .downloader
        .set_fetch_duration(Duration::from_millis(10))
        .await;
    let (tx2, _rx2) = mpsc::unbounded_channel();
    let handle = harness.controller.spawn(manifest, tx2).unwrap();
    handle.wait().await.expect("retry cancelled").unwrap();
}

// =============================================================================
// Manifest Edge Cases
// =============================================================================

#[tokio::test]
async fn test_empty_update_name_still_builds() {
    let harness = TestHarness::new();
    let manifest = UpdateManifest {
        update_name: String::new(),
        files: fixtures::valid_manifest("x").files,
    };
    let (tx, _rx) = mpsc::unbounded_channel();

    let artifact = harness.controller.run(manifest, tx).await.unwrap();
    assert_eq!(artifact.filename, "image.iso");
}
