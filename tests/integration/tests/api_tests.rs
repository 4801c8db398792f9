//! REST API integration tests
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, CreatePollRequest, ErrorEnvelope, TestServer, VoteRequest,
};
use poll_core::Poll;
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body, json!({ "detail": "ok" }));
}

// ============================================================================
// Poll Tests
// ============================================================================

#[tokio::test]
async fn test_create_poll() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = CreatePollRequest::with_options(&["  Rust ", "", "Go", "   "])
        .description("Pick one");

    let response = server.post("/polls", &request).await.unwrap();
    let poll: Poll = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(poll.question, request.question);
    assert_eq!(poll.description.as_deref(), Some("Pick one"));
    assert_eq!(poll.likes, 0);
    let texts: Vec<_> = poll.options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["Rust", "Go"]);
    assert!(poll.options.iter().all(|o| o.votes == 0));
}

#[tokio::test]
async fn test_create_poll_rejects_invalid_input() {
    let server = TestServer::start().await.expect("Failed to start server");

    let cases = [
        CreatePollRequest::with_options(&["Only", "  "]),
        CreatePollRequest::with_options(&["Same", " Same "]),
        CreatePollRequest {
            question: "   ".to_string(),
            description: None,
            options: vec!["A".to_string(), "B".to_string()],
        },
    ];

    for request in cases {
        let response = server.post("/polls", &request).await.unwrap();
        let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST)
            .await
            .unwrap();
        assert_eq!(body.error.code, "VALIDATION_ERROR", "{request:?}");
    }

    let response = server.post("/polls", &json!({ "question": 42 })).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server.get("/polls").await.unwrap();
    let polls: Vec<Poll> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(polls.is_empty());
}

#[tokio::test]
async fn test_list_polls_newest_first() {
    let server = TestServer::start().await.expect("Failed to start server");

    let mut created = Vec::new();
    for _ in 0..3 {
        let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
        let poll: Poll = assert_json(response, StatusCode::CREATED).await.unwrap();
        created.push(poll.id);
    }

    let response = server.get("/polls").await.unwrap();
    let polls: Vec<Poll> = assert_json(response, StatusCode::OK).await.unwrap();
    let listed: Vec<_> = polls.iter().map(|p| p.id).collect();

    created.reverse();
    assert_eq!(listed, created);
}

#[tokio::test]
async fn test_get_poll() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
    let poll: Poll = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server.get(&format!("/polls/{}", poll.id)).await.unwrap();
    let fetched: Poll = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched, poll);

    let response = server.get("/polls/999999").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_POLL");

    let response = server.get("/polls/not-a-number").await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_vote_and_like() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
    let poll: Poll = assert_json(response, StatusCode::CREATED).await.unwrap();
    let option_id = poll.options[1].id.into_inner();

    for _ in 0..2 {
        let response = server
            .post(&format!("/polls/{}/vote", poll.id), &VoteRequest { option_id })
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    let response = server
        .post_empty(&format!("/polls/{}/like", poll.id))
        .await
        .unwrap();
    let liked: Poll = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(liked.likes, 1);
    assert_eq!(liked.options[0].votes, 0);
    assert_eq!(liked.options[1].votes, 2);
    assert_eq!(liked.percentages(), vec![0, 100]);
}

#[tokio::test]
async fn test_vote_for_option_of_another_poll() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
    let first: Poll = assert_json(response, StatusCode::CREATED).await.unwrap();
    let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
    let second: Poll = assert_json(response, StatusCode::CREATED).await.unwrap();

    let foreign = VoteRequest {
        option_id: second.options[0].id.into_inner(),
    };
    let response = server
        .post(&format!("/polls/{}/vote", first.id), &foreign)
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_OPTION");

    let response = server.post_empty("/polls/999999/like").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_POLL");
}

// ============================================================================
// Persistent Store Tests
// ============================================================================

#[tokio::test]
async fn test_server_with_sqlite_store() {
    let mut config = poll_common::AppConfig::local(0);
    config.database = Some(poll_common::DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    });
    let server = TestServer::start_with_config(config)
        .await
        .expect("Failed to start server");

    let first: Poll = assert_json(
        server.post("/polls", &CreatePollRequest::unique()).await.unwrap(),
        StatusCode::CREATED,
    )
    .await
    .unwrap();
    let second: Poll = assert_json(
        server.post("/polls", &CreatePollRequest::unique()).await.unwrap(),
        StatusCode::CREATED,
    )
    .await
    .unwrap();
    assert!(second.id > first.id);
    assert!(second.created_at > first.created_at);

    let vote = VoteRequest {
        option_id: first.options[1].id.into_inner(),
    };
    let voted: Poll = assert_json(
        server
            .post(&format!("/polls/{}/vote", first.id), &vote)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(voted.options[1].votes, 1);

    let polls: Vec<Poll> = assert_json(server.get("/polls").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(polls.len(), 2);
    assert_eq!(polls[0].id, second.id);
    assert_eq!(polls[1], voted);
}
