use std::sync::Arc;

use axum_test::TestServer;
use libreria::db::Database;
use libreria::handler::AppState;
use serde_json::Value;

/// Router on a fresh in-memory database, one per test.
pub async fn setup_test_server() -> TestServer {
    let db = Database::in_memory().await.expect("in-memory database");
    let app = libreria::app(AppState { db: Arc::new(db) });
    TestServer::new(app).expect("test server")
}

#[allow(dead_code)]
pub async fn create(server: &TestServer, path: &str, body: Value) -> Value {
    let response = server.post(path).json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}
