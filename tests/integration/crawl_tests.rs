//! Integration tests for the listing traversal

use crate::fake_page::{listing_page, FakeSite, LISTING_URL};
use crate::test_config;
use folio::crawler::harvest_listing;
use folio::storage::CheckpointLedger;
use folio::{LinkRecord, Termination, TraversalState};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_two_page_listing_harvests_every_link() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let site = FakeSite::new(vec![
        listing_page(&["https://sns.test/alice/", "https://sns.test/bob/"], 1, 2),
        listing_page(&["https://sns.test/carol/"], 2, 2),
    ]);

    let report = harvest_listing(&config, &site, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state(), TraversalState::Done);
    assert_eq!(report.termination, Termination::LastPage);
    assert_eq!(report.pages, 2);
    assert_eq!(report.links_added, 3);
    assert_eq!(site.clicks(), 1);
    assert_eq!(site.navigations(), vec![LISTING_URL]);

    let ledger = CheckpointLedger::open_existing(&config.ledger.path).unwrap();
    assert_eq!(
        ledger.records().unwrap(),
        vec![
            LinkRecord::new("https://sns.test/alice/", false),
            LinkRecord::new("https://sns.test/bob/", false),
            LinkRecord::new("https://sns.test/carol/", false),
        ]
    );

    let content = std::fs::read_to_string(&config.ledger.path).unwrap();
    assert!(content.starts_with("link,image_done\n"));
}

#[tokio::test]
async fn test_rerun_adds_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let site = FakeSite::new(vec![
        listing_page(&["https://sns.test/alice/", "https://sns.test/bob/"], 1, 2),
        listing_page(&["https://sns.test/carol/"], 2, 2),
    ]);

    harvest_listing(&config, &site, &CancellationToken::new())
        .await
        .unwrap();
    let second = harvest_listing(&config, &site, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(second.links_added, 0);
    assert_eq!(second.state(), TraversalState::Done);
    let ledger = CheckpointLedger::open_existing(&config.ledger.path).unwrap();
    assert_eq!(ledger.stats().unwrap().total, 3);
}

#[tokio::test]
async fn test_overlapping_pages_record_links_once() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let site = FakeSite::new(vec![
        listing_page(&["https://sns.test/alice/", "https://sns.test/bob/"], 1, 3),
        listing_page(&["https://sns.test/bob/", "https://sns.test/carol/"], 2, 3),
        listing_page(&[" https://sns.test/carol/ ", "https://sns.test/dave/"], 3, 3),
    ]);

    let report = harvest_listing(&config, &site, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.links_added, 4);
}

#[tokio::test]
async fn test_disabled_control_is_authoritative() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    // The indicator claims more pages, but the control says otherwise
    let site = FakeSite::new(vec![
        listing_page(&["https://sns.test/alice/"], 1, 5),
        listing_page(&["https://sns.test/bob/"], 2, 5),
    ])
    .disabled_from(0);

    let report = harvest_listing(&config, &site, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::ControlDisabled);
    assert_eq!(report.state(), TraversalState::Done);
    assert_eq!(report.pages, 1);
    assert_eq!(site.clicks(), 0);
}

#[tokio::test]
async fn test_interrupt_before_first_page() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let site = FakeSite::new(vec![listing_page(&["https://sns.test/alice/"], 1, 2)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = harvest_listing(&config, &site, &cancel).await.unwrap();

    assert_eq!(report.state(), TraversalState::Interrupted);
    assert_eq!(report.pages, 0);
    assert!(!CheckpointLedger::new(&config.ledger.path).exists());
}
