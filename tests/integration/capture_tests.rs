//! Integration tests for the resumable capture job

use crate::fake_page::{listing_page, FakeSite};
use crate::test_config;
use async_trait::async_trait;
use folio::capture::{
    capture_ledger, CaptureError, CaptureJob, CaptureOutcome, JobReport, LinkCapture,
};
use folio::crawler::harvest_listing;
use folio::storage::{CheckpointLedger, LedgerError};
use folio::{FolioError, LinkRecord};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Writes a placeholder artifact and remembers what it was asked for
#[derive(Default)]
struct FileCapture {
    calls: Vec<String>,
}

#[async_trait]
impl LinkCapture for FileCapture {
    async fn capture(
        &mut self,
        url: &str,
        artifact: &Path,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.calls.push(url.to_string());
        std::fs::write(artifact, b"artifact")?;
        Ok(CaptureOutcome::single())
    }
}

fn write_ledger(path: &Path, body: &str) -> CheckpointLedger {
    std::fs::write(path, body).unwrap();
    CheckpointLedger::open_existing(path).unwrap()
}

#[tokio::test]
async fn test_single_pending_record_is_completed() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let mut ledger = write_ledger(
        Path::new(&config.ledger.path),
        "link,image_done\nhttps://sns.test/alice/,\n",
    );
    let mut capture = FileCapture::default();

    let report = CaptureJob::from_config(&config.capture)
        .run(&mut ledger, &mut capture, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        report,
        JobReport {
            processed: 1,
            skipped: 0,
            errored: 0,
            interrupted: false,
        }
    );
    assert_eq!(
        ledger.records().unwrap(),
        vec![LinkRecord::new("https://sns.test/alice/", true)]
    );
    assert!(PathBuf::from(&config.capture.artifact_dir)
        .join("alice.png")
        .exists());
}

#[tokio::test]
async fn test_completed_record_is_skipped() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let mut ledger = write_ledger(
        Path::new(&config.ledger.path),
        "link,image_done\n\"https://sns.test/alice/\",\n\"https://sns.test/bob/\",\"true\"\n\"https://sns.test/carol/\",\n",
    );
    let mut capture = FileCapture::default();

    let report = CaptureJob::from_config(&config.capture)
        .run(&mut ledger, &mut capture, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.processed, 2);
    assert_eq!(
        capture.calls,
        vec!["https://sns.test/alice/", "https://sns.test/carol/"]
    );
    assert_eq!(ledger.stats().unwrap().pending(), 0);
}

#[tokio::test]
async fn test_missing_ledger_stops_before_any_capture() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let site = FakeSite::new(vec![]);

    let result = capture_ledger(&config, &site, &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(FolioError::Ledger(LedgerError::Missing(_)))
    ));
    assert!(site.navigations().is_empty());
}

#[tokio::test]
async fn test_harvest_then_capture_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let site = FakeSite::new(vec![
        listing_page(&["https://sns.test/alice/", "https://sns.test/bob/"], 1, 2),
        listing_page(&["https://sns.test/carol/"], 2, 2),
    ]);
    let cancel = CancellationToken::new();

    harvest_listing(&config, &site, &cancel).await.unwrap();
    let report = capture_ledger(&config, &site, &cancel).await.unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.errored, 0);

    // 900px pages in a 400px viewport take three overlapping frames
    let artifacts = PathBuf::from(&config.capture.artifact_dir);
    for name in ["alice", "bob", "carol"] {
        let image = image::open(artifacts.join(format!("{}.png", name))).unwrap();
        assert_eq!((image.width(), image.height()), (16, 1200));
    }

    // Nothing is left to do on a second run
    let again = capture_ledger(&config, &site, &cancel).await.unwrap();
    assert_eq!(again.skipped, 3);
    assert_eq!(again.processed, 0);
}
