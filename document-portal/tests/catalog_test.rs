mod common;

use common::{titles, TestApp};
use serde_json::json;

#[tokio::test]
async fn fresh_visitor_sees_all_eksternal_documents_newest_first() {
    let app = TestApp::spawn_without_gate().await;

    let catalog = app.catalog().await;

    assert_eq!(catalog["state"], "ok");
    assert_eq!(
        titles(&catalog),
        vec![
            "Regulasi Program Makan Bergizi Gratis 2025",
            "Infografis Tren Industri",
            "Tutorial Excel Advanced",
        ]
    );

    app.cleanup().await;
}

#[tokio::test]
async fn session_defaults_are_public_and_unfiltered() {
    let app = TestApp::spawn_without_gate().await;

    let session: serde_json::Value = app
        .client
        .get(app.url("/api/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(session["searchTerm"], "");
    assert_eq!(session["selectedCategory"], "All");
    assert_eq!(session["selectedSection"], "Eksternal");
    assert_eq!(session["internalUnlocked"], false);

    app.cleanup().await;
}

#[tokio::test]
async fn category_filter_narrows_the_catalog() {
    let app = TestApp::spawn_without_gate().await;

    let response = app.patch_session(json!({ "selectedCategory": "Memo" })).await;
    assert_eq!(response.status(), 200);

    let catalog = app.catalog().await;
    assert_eq!(
        titles(&catalog),
        vec!["Infografis Tren Industri", "Tutorial Excel Advanced"]
    );

    app.cleanup().await;
}

#[tokio::test]
async fn search_matches_title_or_description_case_insensitively() {
    let app = TestApp::spawn_without_gate().await;

    app.patch_session(json!({ "searchTerm": "EXCEL" })).await;
    assert_eq!(titles(&app.catalog().await), vec!["Tutorial Excel Advanced"]);

    app.patch_session(json!({ "searchTerm": "keputusan" })).await;
    assert_eq!(
        titles(&app.catalog().await),
        vec!["Regulasi Program Makan Bergizi Gratis 2025"]
    );

    app.cleanup().await;
}

#[tokio::test]
async fn no_match_renders_the_empty_state() {
    let app = TestApp::spawn_without_gate().await;

    app.patch_session(json!({ "searchTerm": "tidak ada yang cocok" })).await;
    let catalog = app.catalog().await;

    assert_eq!(catalog["state"], "empty");
    assert_eq!(catalog["documents"], json!([]));
    assert_eq!(catalog["message"], "Tidak ada dokumen ditemukan");

    app.cleanup().await;
}

#[tokio::test]
async fn internal_section_is_locked_until_unlocked() {
    let app = TestApp::spawn_without_gate().await;

    app.patch_session(json!({ "selectedSection": "Internal" })).await;
    let catalog = app.catalog().await;

    assert_eq!(catalog["state"], "locked");
    assert_eq!(catalog["documents"], json!([]));

    app.cleanup().await;
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let app = TestApp::spawn_without_gate().await;

    let response = app.patch_session(json!({ "selectedCategory": "Rahasia" })).await;
    assert_eq!(response.status(), 422);

    let session: serde_json::Value = app
        .client
        .get(app.url("/api/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["selectedCategory"], "All");

    app.cleanup().await;
}

#[tokio::test]
async fn categories_are_listed_in_display_order() {
    let app = TestApp::spawn_without_gate().await;

    let body: serde_json::Value = app
        .client
        .get(app.url("/api/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["categories"], json!(["All", "Panduan", "Data", "Memo"]));
    assert_eq!(body["sections"], json!(["Internal", "Eksternal"]));

    app.cleanup().await;
}
