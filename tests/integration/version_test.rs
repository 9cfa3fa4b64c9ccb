//! Integration tests for version history and rollback.

mod helpers;

use codepage_core::error::ErrorKind;
use codepage_core::types::id::CodepageId;
use codepage_entity::codepage::{CodepageDraft, CodepagePatch};

const V1: &str = "<html><body><script>var total = 1;</script></body></html>";
const V2: &str = "<html><body><script>var total = 2;</script></body></html>";

async fn deploy(app: &helpers::TestApp, name: &str, code: &str) -> CodepageId {
    app.services
        .codepages
        .deploy(app.codepages(), &CodepageDraft::new(name, code))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_save_update_rollback_flow() {
    let app = helpers::TestApp::new().await;
    let versions = &app.services.versions;
    let id = deploy(&app, "Calculator", V1).await;

    let v1 = versions
        .save_version(id, "1.0.0", V1, "Initial release")
        .await
        .unwrap();
    app.services
        .codepages
        .update(app.codepages(), id, &CodepagePatch::code(V2))
        .await
        .unwrap();
    let v2 = versions
        .save_version(id, "2.0.0", V2, "Bigger total")
        .await
        .unwrap();

    let history = versions.list_versions(id, 10).await.unwrap();
    let labels: Vec<_> = history.iter().map(|v| v.version_label.as_str()).collect();
    assert_eq!(labels, vec!["2.0.0", "1.0.0"]);
    assert_eq!(history[0].id, v2);

    let restored = versions.rollback(id, v1).await.unwrap();
    assert_eq!(restored.id, v1);

    let live = app.services.codepages.get(app.codepages(), id).await.unwrap();
    assert_eq!(live.code, V1);
    assert_eq!(versions.list_versions(id, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_snapshot_current_captures_live_code() {
    let app = helpers::TestApp::new().await;
    let versions = &app.services.versions;
    let id = deploy(&app, "Calculator", V1).await;

    let saved = versions
        .snapshot_current(id, "checkpoint", "Before refactor")
        .await
        .unwrap();
    let version = versions.get_version(saved).await.unwrap();

    assert_eq!(version.codepage_id, id);
    assert_eq!(version.code_snapshot, V1);
    assert_eq!(version.change_log, "Before refactor");
}

#[tokio::test]
async fn test_repeated_labels_create_distinct_versions() {
    let app = helpers::TestApp::new().await;
    let versions = &app.services.versions;
    let id = deploy(&app, "Calculator", V1).await;

    let a = versions.save_version(id, "nightly", V1, "").await.unwrap();
    let b = versions.save_version(id, "nightly", V2, "").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(app.store.row_count(helpers::VERSIONS), 2);
}

#[tokio::test]
async fn test_history_is_scoped_to_codepage_and_limited() {
    let app = helpers::TestApp::new().await;
    let versions = &app.services.versions;
    let first = deploy(&app, "First", V1).await;
    let second = deploy(&app, "Second", V2).await;

    for label in ["a", "b", "c"] {
        versions.save_version(first, label, V1, "").await.unwrap();
    }
    versions.save_version(second, "other", V2, "").await.unwrap();

    let history = versions.list_versions(first, 2).await.unwrap();
    let labels: Vec<_> = history.iter().map(|v| v.version_label.as_str()).collect();
    assert_eq!(labels, vec!["c", "b"]);
    assert!(history.iter().all(|v| v.codepage_id == first));
}

#[tokio::test]
async fn test_rollback_rejects_foreign_version() {
    let app = helpers::TestApp::new().await;
    let versions = &app.services.versions;
    let first = deploy(&app, "First", V1).await;
    let second = deploy(&app, "Second", V2).await;
    let foreign = versions.save_version(second, "1.0.0", V2, "").await.unwrap();

    let err = versions.rollback(first, foreign).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    let live = app.services.codepages.get(app.codepages(), first).await.unwrap();
    assert_eq!(live.code, V1);
}

#[tokio::test]
async fn test_empty_snapshot_is_rejected() {
    let app = helpers::TestApp::new().await;
    let id = deploy(&app, "Calculator", V1).await;

    let err = app
        .services
        .versions
        .save_version(id, "blank", "   ", "")
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.store.row_count(helpers::VERSIONS), 0);
}
