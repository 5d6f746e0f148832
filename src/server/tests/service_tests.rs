//! Provisioning workflow tests.

use super::{AGENT, Harness, harness};
use crate::protocol::StatusUpdate;
use crate::records::domain::{ExpiryExtension, ExpiryUnit, RecordId, Visibility};
use crate::records::ports::RecordRepository;
use crate::server::{ClientRequest, ProvisioningError};
use crate::status::StatusCode;
use crate::vendor::adapters::InMemoryVendorAdapter;
use crate::vendor::domain::Vendor;
use rstest::rstest;

fn request(database: &str) -> ClientRequest {
    ClientRequest {
        agent_identifier: AGENT.to_owned(),
        database_name: database.to_owned(),
        username: database.to_owned(),
        password: "secret".to_owned(),
        ..ClientRequest::default()
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_stores_the_agent_outcome(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");

    assert_eq!(record.status(), StatusCode::SUCCESS);
    assert_eq!(record.creator(), "alice");
    assert_eq!(record.vendor(), Vendor::Postgres);
    assert!(harness.database.has_database("shop"));
    let id = record.id().expect("stored");
    let stored = harness
        .records
        .fetch_by_id(id)
        .await
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status(), StatusCode::SUCCESS);
    assert_eq!(stored.fields().database_address, "db.internal");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_correlates_the_agent_call_with_the_record_id(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");

    let calls = harness.client.calls();
    let (operation, sent) = calls.first().expect("one call");
    assert_eq!(operation, "create");
    assert_eq!(Some(RecordId::new(sent.id)), record.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_credentials_are_generated(harness: Harness) {
    let bare = ClientRequest {
        agent_identifier: AGENT.to_owned(),
        ..ClientRequest::default()
    };

    let record = harness.service().create("alice", bare).await.expect("create");

    assert!(record.database_user().starts_with("dbf_"));
    assert_eq!(record.database_name(), record.database_user());
    assert_eq!(record.database_password().len(), 16);
}

#[rstest]
#[case::missing_agent("")]
#[case::blank_agent("   ")]
#[tokio::test(flavor = "multi_thread")]
async fn agent_identifier_is_required(harness: Harness, #[case] agent: &str) {
    let mut incomplete = request("shop");
    incomplete.agent_identifier = agent.to_owned();

    let result = harness.service().create("alice", incomplete).await;

    assert!(matches!(result, Err(ProvisioningError::Validation(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_agent_is_not_found(harness: Harness) {
    let mut elsewhere = request("shop");
    elsewhere.agent_identifier = "mysql-8".to_owned();

    let result = harness.service().create("alice", elsewhere).await;

    assert!(matches!(result, Err(ProvisioningError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn import_requires_a_dump_location(harness: Harness) {
    let result = harness.service().import("alice", request("shop")).await;

    assert!(matches!(result, Err(ProvisioningError::Validation(message)) if message.contains("dumpfile_location")));
    assert!(harness.client.calls().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_database_is_rejected_and_leaves_no_record(harness: Harness) {
    harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("first create");

    let result = harness.service().create("bob", request("shop")).await;

    assert!(matches!(result, Err(ProvisioningError::AlreadyExists(_))));
    let all = harness.records.fetch_all().await.expect("fetch");
    assert_eq!(all.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_agent_leaves_no_record(harness: Harness) {
    harness.client.set_unreachable(AGENT, true);

    let result = harness.service().create("alice", request("shop")).await;

    assert!(matches!(result, Err(ProvisioningError::BackendUnavailable(_))));
    assert!(harness.records.fetch_all().await.expect("fetch").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn import_stays_in_progress_until_callbacks_arrive(harness: Harness) {
    let mut import = request("shop");
    import.dump_location = "https://dumps.internal/shop.sql.gz".to_owned();

    let record = harness.service().import("alice", import).await.expect("import");
    let id = record.id().expect("stored");

    assert_eq!(record.status(), StatusCode::STARTED);
    let applied = harness
        .service()
        .apply_status(StatusUpdate {
            id: id.into_inner(),
            status: StatusCode::SUCCESS,
            message: "import finished".to_owned(),
        })
        .await
        .expect("apply");
    assert!(applied);
    let stored = harness.service().get("alice", id).await.expect("get");
    assert_eq!(stored.status(), StatusCode::SUCCESS);
    assert_eq!(stored.message(), "import finished");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_for_unknown_record_is_dropped(harness: Harness) {
    let applied = harness
        .service()
        .apply_status(StatusUpdate {
            id: 4242,
            status: StatusCode::IMPORT_FAILED,
            message: "boom".to_owned(),
        })
        .await
        .expect("apply");

    assert!(!applied);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_for_a_removed_record_does_not_recreate_it(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");
    harness.records.delete(id).await.expect("delete");

    let applied = harness
        .service()
        .apply_status(StatusUpdate {
            id: id.into_inner(),
            status: StatusCode::IMPORT_IN_PROGRESS,
            message: "importing".to_owned(),
        })
        .await
        .expect("callback");

    assert!(!applied);
    assert!(harness.records.fetch_all().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_callback_keeps_concurrent_visibility_changes(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");
    let mut edited = record.clone();
    edited.set_visibility(Visibility::Public);
    harness.records.update(&edited).await.expect("update");

    harness
        .service()
        .apply_status(StatusUpdate {
            id: id.into_inner(),
            status: StatusCode::IMPORT_FAILED,
            message: "import failed".to_owned(),
        })
        .await
        .expect("callback");

    let stored = harness
        .records
        .fetch_by_id(id)
        .await
        .expect("fetch")
        .expect("kept");
    assert_eq!(stored.status(), StatusCode::IMPORT_FAILED);
    assert_eq!(stored.message(), "import failed");
    assert_eq!(stored.visibility(), Visibility::Public);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn private_records_are_hidden_from_other_callers(harness: Harness) {
    let private = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let mut shared = request("wiki");
    shared.visibility = Visibility::Public;
    harness.service().create("bob", shared).await.expect("create");
    let id = private.id().expect("stored");

    let listed = harness.service().list_visible("carol").await.expect("list");
    let denied = harness.service().get("carol", id).await;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|record| record.database_name()), Some("wiki"));
    assert!(matches!(denied, Err(ProvisioningError::AccessDenied)));
    assert_eq!(
        harness.service().list_visible("alice").await.expect("list").len(),
        2
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_drops_the_database_and_the_record(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");

    harness.service().delete("alice", id).await.expect("delete");

    assert!(!harness.database.has_database("shop"));
    assert!(harness.records.fetch_by_id(id).await.expect("fetch").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_drop_keeps_the_record_flagged() {
    let harness =
        Harness::with_database(InMemoryVendorAdapter::new(Vendor::Postgres).with_failing_drops());
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");

    let result = harness.service().delete("alice", id).await;

    assert!(matches!(result, Err(ProvisioningError::ExternalTool { .. })));
    let kept = harness.service().get("alice", id).await.expect("kept");
    assert_eq!(kept.status(), StatusCode::DROP_DATABASE_FAILED);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_of_a_departed_agent_removes_only_the_record(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");
    harness.registry.remove(AGENT);

    harness.service().delete("alice", id).await.expect("delete");

    assert!(harness.database.has_database("shop"));
    assert!(harness.records.fetch_by_id(id).await.expect("fetch").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expiry_extension_counts_from_the_current_expiry(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");
    let extension = ExpiryExtension::new(14, ExpiryUnit::Days).expect("extension");

    let extended = harness
        .service()
        .extend_expiry("alice", id, extension)
        .await
        .expect("extend");

    assert_eq!(
        extended.expires_at() - record.expires_at(),
        chrono::Duration::days(14)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn visibility_changes_require_access(harness: Harness) {
    let record = harness
        .service()
        .create("alice", request("shop"))
        .await
        .expect("create");
    let id = record.id().expect("stored");

    let denied = harness
        .service()
        .set_visibility("bob", id, Visibility::Public)
        .await;
    let shared = harness
        .service()
        .set_visibility("alice", id, Visibility::Public)
        .await
        .expect("share");

    assert!(matches!(denied, Err(ProvisioningError::AccessDenied)));
    assert_eq!(shared.visibility(), Visibility::Public);
    assert!(harness.service().get("bob", id).await.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restart_is_unsafe_while_imports_run(harness: Harness) {
    let mut import = request("shop");
    import.dump_location = "/dumps/shop.sql".to_owned();
    let idle = harness.service().safe_to_restart().await.expect("report");

    harness.service().import("alice", import).await.expect("import");
    let busy = harness.service().safe_to_restart().await.expect("report");

    assert!(idle.server);
    assert_eq!(idle.agents.get(AGENT), Some(&0));
    assert!(!busy.server);
    assert_eq!(busy.agents.get(AGENT), Some(&1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_outage_surfaces_as_unavailable(harness: Harness) {
    harness.records.set_available(false);

    let result = harness.service().list_visible("alice").await;

    assert!(matches!(result, Err(ProvisioningError::BackendUnavailable(_))));
}
