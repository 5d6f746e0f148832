//! Import queue tests.

use super::support::write_plain;
use crate::import::adapters::{HttpDumpFetcher, RecordingStatusReporter};
use crate::import::services::{ImportPipeline, ImportQueue, QueueError};
use crate::status::StatusCode;
use crate::vendor::adapters::InMemoryVendorAdapter;
use crate::vendor::domain::{DbRequest, Vendor};
use crate::vendor::ports::VendorAdapter;
use std::sync::Arc;
use std::time::Duration;

fn pipeline(
    adapter: &InMemoryVendorAdapter,
    reporter: &RecordingStatusReporter,
    scratch: &tempfile::TempDir,
) -> Arc<ImportPipeline> {
    Arc::new(ImportPipeline::new(
        Arc::new(adapter.clone()),
        Arc::new(HttpDumpFetcher::default()),
        Arc::new(reporter.clone()),
        scratch.path(),
    ))
}

#[tokio::test(flavor = "multi_thread")]
async fn queued_imports_are_processed_by_workers() {
    let dumps = tempfile::tempdir().expect("dump dir");
    let scratch = tempfile::tempdir().expect("scratch dir");
    let adapter = InMemoryVendorAdapter::new(Vendor::Postgres);
    let reporter = RecordingStatusReporter::new();
    let (queue, _workers) = ImportQueue::start(pipeline(&adapter, &reporter, &scratch), 2, 4);
    let request = DbRequest {
        id: 9,
        database_name: "orders".to_owned(),
        username: "orders".to_owned(),
        password: "pw".to_owned(),
        dump_location: write_plain(dumps.path(), "orders.sql").display().to_string(),
    };
    adapter.create_database(&request).await.expect("create");

    queue.try_reserve().expect("slot available").submit(request);

    let mut finished = false;
    for _ in 0..100 {
        if reporter.statuses().contains(&StatusCode::SUCCESS) {
            finished = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(finished, "import should complete");
    assert!(adapter.imported_dump("orders").is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn held_slots_exhaust_the_queue() {
    let scratch = tempfile::tempdir().expect("scratch dir");
    let adapter = InMemoryVendorAdapter::new(Vendor::Postgres);
    let reporter = RecordingStatusReporter::new();
    let (queue, _workers) = ImportQueue::start(pipeline(&adapter, &reporter, &scratch), 1, 2);

    let first = queue.try_reserve().expect("first slot");
    let second = queue.try_reserve().expect("second slot");

    assert_eq!(queue.available(), 0);
    assert_eq!(queue.try_reserve().err(), Some(QueueError::Full));

    drop(first);
    drop(second);
    assert_eq!(queue.available(), 2);
}
