mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("health request failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("health body was not json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "booking-service");
}
