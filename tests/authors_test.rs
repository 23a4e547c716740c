//! Author and category resources: validation, eager-loaded books and the
//! show/update/destroy lifecycle.

use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;

#[tokio::test]
async fn test_store_author_requires_name() {
    let server = common::setup_test_server().await;

    for body in [json!({}), json!({"name": ""}), json!({"name": "   "}), json!({"name": null})] {
        let response = server.post("/api/authors").json(&body).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let error: Value = response.json();
        assert_eq!(error["message"], "The name field is required.");
        assert_eq!(error["errors"]["name"][0], "The name field is required.");
    }

    let authors: Value = server.get("/api/authors").await.json();
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn test_store_and_show_author() {
    let server = common::setup_test_server().await;

    let author = common::create(&server, "/api/authors", json!({"name": "Jane Doe"})).await;
    assert_eq!(author["id"], 1);
    assert_eq!(author["name"], "Jane Doe");
    assert!(author.get("books").is_none());
    assert!(author["created_at"].is_string());

    let response = server.get("/api/authors/1").await;
    response.assert_status_ok();
    let shown: Value = response.json();
    assert_eq!(shown["name"], "Jane Doe");
    assert_eq!(shown["books"], json!([]));
}

#[tokio::test]
async fn test_index_eager_loads_books() {
    let server = common::setup_test_server().await;

    let jane = common::create(&server, "/api/authors", json!({"name": "Jane Doe"})).await;
    common::create(&server, "/api/authors", json!({"name": "John Roe"})).await;
    common::create(
        &server,
        "/api/books",
        json!({"title": "Book A", "author_id": jane["id"], "category_id": null}),
    )
    .await;

    let authors: Value = server.get("/api/authors").await.json();
    let authors = authors.as_array().unwrap();
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0]["name"], "Jane Doe");
    assert_eq!(authors[0]["books"][0]["title"], "Book A");
    assert_eq!(authors[1]["name"], "John Roe");
    assert_eq!(authors[1]["books"], json!([]));
}

#[tokio::test]
async fn test_update_author_keeps_id() {
    let server = common::setup_test_server().await;
    let author = common::create(&server, "/api/authors", json!({"name": "Jane Doe"})).await;

    let response = server.put("/api/authors/1").json(&json!({"name": "Jane Q. Doe"})).await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["id"], author["id"]);
    assert_eq!(updated["name"], "Jane Q. Doe");

    let response = server.patch("/api/authors/1").json(&json!({})).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Jane Q. Doe");

    server
        .put("/api/authors/1")
        .json(&json!({"name": ""}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .put("/api/authors/99")
        .json(&json!({"name": "Nobody"}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_missing_author_is_404_before_validation() {
    let server = common::setup_test_server().await;

    let response = server.put("/api/authors/99").json(&json!({"name": ""})).await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["message"], "Author not found");

    server
        .patch("/api/categories/99")
        .json(&json!({"name": ""}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_numeric_name_is_stored_as_text() {
    let server = common::setup_test_server().await;

    let author = common::create(&server, "/api/authors", json!({"name": 42})).await;
    assert_eq!(author["name"], "42");
}

#[tokio::test]
async fn test_malformed_body_answers_with_json_errors() {
    let server = common::setup_test_server().await;

    let response = server.post("/api/authors").json(&json!({"name": ["Jane"]})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.header("content-type").to_str().unwrap().starts_with("application/json"));
    let error: Value = response.json();
    assert!(error["message"].is_string());
    assert!(error["errors"]["name"][0].as_str().unwrap().starts_with("The name field is invalid"));

    let response = server
        .post("/api/authors")
        .content_type("application/json")
        .bytes("{\"name\":".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"].is_string());

    let response = server.post("/api/authors").text("name=Jane").await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(response.json::<Value>()["message"].is_string());

    let authors: Value = server.get("/api/authors").await.json();
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn test_destroy_author() {
    let server = common::setup_test_server().await;
    common::create(&server, "/api/authors", json!({"name": "Jane Doe"})).await;

    let response = server.delete("/api/authors/1").await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());

    let response = server.get("/api/authors/1").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["message"], "Author not found");

    server.delete("/api/authors/1").await.assert_status_not_found();
}

#[tokio::test]
async fn test_category_lifecycle() {
    let server = common::setup_test_server().await;

    server
        .post("/api/categories")
        .json(&json!({"title": "wrong field"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let category = common::create(&server, "/api/categories", json!({"name": "Fiction"})).await;
    let id = category["id"].as_i64().unwrap();
    common::create(&server, "/api/books", json!({"title": "Novel", "category_id": id})).await;

    let shown: Value = server.get(&format!("/api/categories/{id}")).await.json();
    assert_eq!(shown["name"], "Fiction");
    assert_eq!(shown["books"][0]["title"], "Novel");

    let updated: Value = server
        .patch(&format!("/api/categories/{id}"))
        .json(&json!({"name": "Literary Fiction"}))
        .await
        .json();
    assert_eq!(updated["name"], "Literary Fiction");

    server
        .delete(&format!("/api/categories/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/categories/{id}"))
        .await
        .assert_status_not_found();

    let categories: Value = server.get("/api/categories").await.json();
    assert_eq!(categories, json!([]));
}

#[tokio::test]
async fn test_non_numeric_id_is_client_error() {
    let server = common::setup_test_server().await;
    let response = server.get("/api/authors/abc").await;
    assert!(response.status_code().is_client_error());
}
