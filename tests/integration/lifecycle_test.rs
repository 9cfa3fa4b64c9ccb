//! Integration tests for the codepage lifecycle against the fake store.

mod helpers;

use codepage_core::error::ErrorKind;
use codepage_core::types::id::CodepageId;
use codepage_entity::codepage::{CodepageDraft, CodepagePatch};
use codepage_entity::validation::ValidationOptions;
use codepage_service::codec::{self, Format};
use codepage_service::{DeployOutcome, SearchRequest};

const CALCULATOR: &str = r#"<!DOCTYPE html>
<html>
<head><title>Calculator</title></head>
<body>
<script>
function add(a, b) { return a + b; }
</script>
</body>
</html>"#;

#[tokio::test]
async fn test_deploy_and_get() {
    let app = helpers::TestApp::new().await;
    let draft = CodepageDraft::new("Calculator", CALCULATOR)
        .with_version("1.0.0")
        .with_description("Adds numbers")
        .with_tags(["math", "ui"]);

    let id = app
        .services
        .codepages
        .deploy(app.codepages(), &draft)
        .await
        .unwrap();
    let cp = app.services.codepages.get(app.codepages(), id).await.unwrap();

    assert_eq!(cp.id, id);
    assert_eq!(cp.name, "Calculator");
    assert_eq!(cp.code, CALCULATOR);
    assert_eq!(cp.version.as_deref(), Some("1.0.0"));
    assert_eq!(cp.tags, vec!["math", "ui"]);
    assert!(cp.active);
    assert!(cp.created_date.is_some());
}

#[tokio::test]
async fn test_get_unknown_is_not_found() {
    let app = helpers::TestApp::new().await;
    let err = app
        .services
        .codepages
        .get(app.codepages(), CodepageId(404))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let app = helpers::TestApp::new().await;
    let mut ids = Vec::new();
    for name in ["First", "Second", "Third"] {
        ids.push(
            app.services
                .codepages
                .deploy(app.codepages(), &CodepageDraft::new(name, "<p>x</p>"))
                .await
                .unwrap(),
        );
    }

    let listed = app.services.codepages.list(app.codepages(), 2).await.unwrap();
    let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second"]);
    assert_eq!(listed[0].id, ids[2]);
}

#[tokio::test]
async fn test_update_overwrites_only_given_fields() {
    let app = helpers::TestApp::new().await;
    let id = app
        .services
        .codepages
        .deploy(
            app.codepages(),
            &CodepageDraft::new("Calculator", CALCULATOR).with_version("1.0.0"),
        )
        .await
        .unwrap();

    let patch = CodepagePatch {
        version: Some("1.1.0".into()),
        description: Some("Now with subtraction".into()),
        ..CodepagePatch::default()
    };
    app.services
        .codepages
        .update(app.codepages(), id, &patch)
        .await
        .unwrap();

    let cp = app.services.codepages.get(app.codepages(), id).await.unwrap();
    assert_eq!(cp.version.as_deref(), Some("1.1.0"));
    assert_eq!(cp.description.as_deref(), Some("Now with subtraction"));
    assert_eq!(cp.name, "Calculator");
    assert_eq!(cp.code, CALCULATOR);
}

#[tokio::test]
async fn test_empty_update_is_rejected_without_a_request() {
    let app = helpers::TestApp::new().await;
    let before = app.store.data_requests();

    let err = app
        .services
        .codepages
        .update(app.codepages(), CodepageId(1), &CodepagePatch::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NoOpUpdate);
    assert_eq!(app.store.data_requests(), before);
}

#[tokio::test]
async fn test_update_of_missing_record_is_rejected_by_store() {
    let app = helpers::TestApp::new().await;
    let err = app
        .services
        .codepages
        .update(app.codepages(), CodepageId(77), &CodepagePatch::code("<p>y</p>"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Http);
    assert!(err.message.contains("77"));
}

#[tokio::test]
async fn test_search_combines_criteria() {
    let app = helpers::TestApp::new().await;
    let codepages = &app.services.codepages;
    let drafts = [
        CodepageDraft::new("Calculator", "<p>1</p>").with_tags(["math", "ui"]),
        CodepageDraft::new("Scientific calc", "<p>2</p>").with_tags(["math"]),
        CodepageDraft::new("Report", "<p>3</p>").with_description("Monthly calc export"),
        CodepageDraft::new("Old calculator", "<p>4</p>")
            .with_tags(["math", "ui"])
            .with_active(false),
    ];
    for draft in &drafts {
        codepages.deploy(app.codepages(), draft).await.unwrap();
    }

    let by_term = codepages
        .search(app.codepages(), &SearchRequest::term("CALC"))
        .await
        .unwrap();
    let names: Vec<_> = by_term.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Report", "Scientific calc", "Calculator"]);

    let tagged = SearchRequest {
        tags: vec!["math".into(), "ui".into()],
        ..SearchRequest::default()
    };
    let found = codepages.search(app.codepages(), &tagged).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Calculator");

    let with_inactive = SearchRequest {
        active_only: false,
        ..tagged
    };
    let found = codepages
        .search(app.codepages(), &with_inactive)
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].name, "Old calculator");
}

#[tokio::test]
async fn test_search_on_collection_without_optional_columns() {
    let app = helpers::TestApp::new().await;
    app.store
        .drop_columns(helpers::CODEPAGES, &["Description", "Active"]);
    let codepages = &app.services.codepages;

    codepages
        .deploy(
            app.codepages(),
            &CodepageDraft::new("Calculator", "<p>1</p>").with_description("Adds numbers"),
        )
        .await
        .unwrap();
    codepages
        .deploy(app.codepages(), &CodepageDraft::new("Report", "<p>2</p>").with_active(false))
        .await
        .unwrap();

    let everything = codepages
        .search(app.codepages(), &SearchRequest::default())
        .await
        .unwrap();
    assert_eq!(everything.len(), 2);
    assert!(everything.iter().all(|c| c.active && c.description.is_none()));

    let by_term = codepages
        .search(app.codepages(), &SearchRequest::term("calc"))
        .await
        .unwrap();
    assert_eq!(by_term.len(), 1);
    assert_eq!(by_term[0].name, "Calculator");
}

#[tokio::test]
async fn test_deactivate_hides_from_search_and_reactivate_restores() {
    let app = helpers::TestApp::new().await;
    let codepages = &app.services.codepages;
    let id = codepages
        .deploy(app.codepages(), &CodepageDraft::new("Widget", "<p>w</p>"))
        .await
        .unwrap();

    codepages.set_active(app.codepages(), id, false).await.unwrap();
    let found = codepages
        .search(app.codepages(), &SearchRequest::term("widget"))
        .await
        .unwrap();
    assert!(found.is_empty());
    assert!(!codepages.get(app.codepages(), id).await.unwrap().active);

    codepages.set_active(app.codepages(), id, true).await.unwrap();
    let found = codepages
        .search(app.codepages(), &SearchRequest::term("widget"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_clone_copies_fields_under_new_name() {
    let app = helpers::TestApp::new().await;
    let codepages = &app.services.codepages;
    let source = codepages
        .deploy(
            app.codepages(),
            &CodepageDraft::new("Calculator", CALCULATOR)
                .with_version("2.0.0")
                .with_tags(["math"]),
        )
        .await
        .unwrap();

    let modifications = CodepagePatch {
        version: Some("2.0.0-beta".into()),
        ..CodepagePatch::default()
    };
    let copy = codepages
        .clone_codepage(app.codepages(), source, "Calculator (beta)", &modifications)
        .await
        .unwrap();

    assert_ne!(copy, source);
    let cloned = codepages.get(app.codepages(), copy).await.unwrap();
    assert_eq!(cloned.name, "Calculator (beta)");
    assert_eq!(cloned.code, CALCULATOR);
    assert_eq!(cloned.tags, vec!["math"]);
    assert_eq!(cloned.version.as_deref(), Some("2.0.0-beta"));

    let original = codepages.get(app.codepages(), source).await.unwrap();
    assert_eq!(original.name, "Calculator");
    assert_eq!(original.version.as_deref(), Some("2.0.0"));
}

#[tokio::test]
async fn test_validated_deploy_blocks_dangerous_code() {
    let app = helpers::TestApp::new().await;
    let draft = CodepageDraft::new("Evil", "<script>eval(location.hash.slice(1));</script>");

    let outcome = app
        .services
        .codepages
        .deploy_validated(app.codepages(), &draft, &ValidationOptions::default())
        .await
        .unwrap();

    match outcome {
        DeployOutcome::Blocked(report) => {
            assert!(!report.is_valid);
            assert!(!report.security_issues.is_empty());
        }
        DeployOutcome::Deployed { id, .. } => panic!("Dangerous code deployed as {id}"),
    }
    assert_eq!(app.store.row_count(helpers::CODEPAGES), 0);
}

#[tokio::test]
async fn test_validated_deploy_accepts_clean_code() {
    let app = helpers::TestApp::new().await;
    let draft = CodepageDraft::new("Calculator", CALCULATOR);

    let outcome = app
        .services
        .codepages
        .deploy_validated(app.codepages(), &draft, &ValidationOptions::default())
        .await
        .unwrap();

    assert!(matches!(outcome, DeployOutcome::Deployed { .. }));
    assert_eq!(app.store.row_count(helpers::CODEPAGES), 1);
}

#[tokio::test]
async fn test_deploy_batch_reports_each_outcome() {
    let app = helpers::TestApp::new().await;
    let drafts = vec![
        CodepageDraft::new("One", "<p>1</p>"),
        CodepageDraft::new("", "<p>2</p>"),
        CodepageDraft::new("Three", "<p>3</p>"),
    ];

    let results = app
        .services
        .codepages
        .deploy_batch(app.codepages(), &drafts)
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().kind, ErrorKind::Validation);
    assert!(results[2].is_ok());
    assert_eq!(app.store.row_count(helpers::CODEPAGES), 2);
}

#[tokio::test]
async fn test_exported_document_redeploys_as_equal_codepage() {
    let app = helpers::TestApp::new().await;
    let codepages = &app.services.codepages;
    let id = codepages
        .deploy(
            app.codepages(),
            &CodepageDraft::new("Calculator", CALCULATOR)
                .with_version("3.1.0")
                .with_tags(["math", "ui"]),
        )
        .await
        .unwrap();
    let original = codepages.get(app.codepages(), id).await.unwrap();

    let markdown = codec::export(&original, Format::HumanReadable).unwrap();
    let draft = codec::import(&markdown, Some(Format::HumanReadable), None).unwrap();
    let copy_id = codepages.deploy(app.codepages(), &draft).await.unwrap();
    let copy = codepages.get(app.codepages(), copy_id).await.unwrap();

    assert_eq!(copy.to_draft(), original.to_draft());
}

#[tokio::test]
async fn test_raw_import_takes_document_title() {
    let draft = codec::import(CALCULATOR, None, None).unwrap();
    assert_eq!(draft.name, "Calculator");
    assert_eq!(draft.code, CALCULATOR);
}
