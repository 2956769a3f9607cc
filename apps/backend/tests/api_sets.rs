//! Study set API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use common::fixtures;
use common::TestContext;

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_and_get_set() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let response = server
        .post("/api/sets")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::create_set_request("Spanish", fixtures::SPANISH))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .get(&format!("/api/sets/{id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Spanish");
    assert_eq!(body["owner_id"], user_id.to_string());
    let cards = body["flashcards"].as_array().unwrap();
    assert_eq!(cards.len(), 4);
    assert_eq!(cards[0]["term"], "perro");
    assert_eq!(cards[3]["position"], 3);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_blank_title_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let response = server
        .post("/api/sets")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::create_set_request("   ", &[]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_only_owner_can_modify() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (owner_id, _) = ctx.create_test_user(Some("owner")).await;
    let (other_id, other_token) = ctx.create_test_user(Some("other")).await;
    let set_id = ctx.create_test_set(owner_id, fixtures::SPANISH).await;

    let response = server
        .put(&format!("/api/sets/{set_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .json(&fixtures::create_set_request("Hijacked", &[]))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/api/sets/{set_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post(&format!("/api/sets/{set_id}/import"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .json(&json!({ "content": fixtures::sample_csv() }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Reading is open to everyone.
    let response = server
        .get(&format!("/api/sets/{set_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .await;
    response.assert_status_ok();

    ctx.cleanup_user(other_id).await;
    ctx.cleanup_user(owner_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_replaces_cards() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, fixtures::SPANISH).await;

    let response = server
        .put(&format!("/api/sets/{set_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::create_set_request("Renamed", &[("uno", "one")]))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let cards = ctx.db.get_flashcards(set_id).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].term, "uno");
    let set = ctx.db.get_study_set(set_id).await.unwrap().unwrap();
    assert_eq!(set.title, "Renamed");

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_import_appends_and_reports_errors() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, &[("perro", "dog")]).await;

    let response = server
        .post(&format!("/api/sets/{set_id}/import"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "content": fixtures::sample_csv() }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["imported"], 2);
    assert_eq!(body["errors"], json!(["Line 3: Term is empty"]));

    let cards = ctx.db.get_flashcards(set_id).await.unwrap();
    let terms: Vec<&str> = cards.iter().map(|c| c.term.as_str()).collect();
    assert_eq!(terms, vec!["perro", "sol", "agua, fría"]);
    assert_eq!(cards[2].position, 2);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_import_without_valid_rows_is_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, &[]).await;

    let response = server
        .post(&format!("/api/sets/{set_id}/import"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "content": ",b\nc,\n" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "parse_error");
    assert_eq!(body["details"][0], "Line 1: Term is empty");
    assert_eq!(body["details"][1], "Line 2: Definition is empty");

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_export_csv() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx
        .create_test_set(user_id, &[("hola", "hello"), ("adiós", "bye, later")])
        .await;

    let response = server
        .get(&format!("/api/sets/{set_id}/export"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.text(),
        "term,definition\nhola,hello\nadiós,\"bye, later\""
    );

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_missing_set_is_not_found() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let response = server
        .get(&format!("/api/sets/{}", uuid::Uuid::new_v4()))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup_user(user_id).await;
}
