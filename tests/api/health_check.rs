use serde_json::json;
use serde_json::Value;

use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check() {
    let app = spawn_app().await;

    let resp = app
        .api_client
        .get(format!("{}/api/health", app.addr))
        .send()
        .await
        .expect("execute request");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"message": "Backend is running!"}));

    // the probe never touches the mail transport
    assert!(app.sent().is_empty());
}
