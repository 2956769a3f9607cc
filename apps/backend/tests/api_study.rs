//! Test generation, match board and saved result API tests.
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
async fn test_generate_test_cycles_types() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, fixtures::SPANISH).await;

    let response = server
        .post(&format!("/api/sets/{set_id}/test"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "question_count": 3, "question_types": ["written", "multiple-choice"] }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0]["type"], "written");
    assert_eq!(questions[1]["type"], "multiple-choice");
    assert_eq!(questions[1]["options"].as_array().unwrap().len(), 4);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_empty_set_cannot_be_studied() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, &[]).await;

    let response = server
        .get(&format!("/api/sets/{set_id}/match"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_match_board() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, fixtures::SPANISH).await;

    let response = server
        .get(&format!("/api/sets/{set_id}/match"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_pairs"], 4);
    assert_eq!(body["tiles"].as_array().unwrap().len(), 8);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_results_history_and_stats() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, fixtures::SPANISH).await;

    for (score, total) in [(3, 4), (4, 4), (1, 3)] {
        server
            .post("/api/test-results")
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
            .json(&fixtures::test_result_request(set_id, score, total))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .get(&format!("/api/test-results?study_set_id={set_id}&limit=2"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status_ok();
    let history: Vec<serde_json::Value> = response.json();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["percentage"], 33);
    assert_eq!(history[0]["study_set_title"], "Test Set");

    let response = server
        .get("/api/test-results/stats")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    let stats: serde_json::Value = response.json();
    assert_eq!(stats["total_tests"], 3);
    // (75 + 100 + 33) / 3 = 69.33
    assert_eq!(stats["average_score"], 69);
    assert_eq!(stats["best_score"], 100);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_results_are_private() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;
    let (other_id, other_token) = ctx.create_test_user(None).await;
    let set_id = ctx.create_test_set(user_id, fixtures::SPANISH).await;

    let response = server
        .post("/api/test-results")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::test_result_request(set_id, 2, 4))
        .await;
    let id = response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    server
        .get(&format!("/api/test-results/{id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .delete(&format!("/api/test-results/{id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/test-results/{id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup_user(other_id).await;
    ctx.cleanup_user(user_id).await;
}
