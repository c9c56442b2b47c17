mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn_without_gate().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "document-portal");

    app.cleanup().await;
}

#[tokio::test]
async fn readiness_reports_memory_catalog() {
    let app = TestApp::spawn_without_gate().await;

    let response = app.client.get(app.url("/ready")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["catalog"], "memory");

    app.cleanup().await;
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn_without_gate().await;

    let response = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "portal-req-1")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "portal-req-1");
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    app.cleanup().await;
}
