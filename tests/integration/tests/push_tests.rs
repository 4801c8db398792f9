//! Push channel integration tests
//!
//! Run with: cargo test -p integration-tests --test push_tests

use std::time::Duration;

use futures_util::SinkExt;
use integration_tests::{
    assert_json, assert_no_event, next_event, CreatePollRequest, TestServer, VoteRequest,
};
use poll_core::{Poll, PollEvent};
use reqwest::StatusCode;
use tokio_tungstenite::tungstenite::Message;

async fn create_poll(server: &TestServer) -> Poll {
    let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

#[tokio::test]
async fn test_first_frame_is_snapshot() {
    let server = TestServer::start().await.expect("Failed to start server");
    let older = create_poll(&server).await;
    let newer = create_poll(&server).await;

    let mut ws = server.connect_ws().await.unwrap();
    match next_event(&mut ws).await.unwrap() {
        PollEvent::Snapshot { polls } => assert_eq!(polls, vec![newer, older]),
        other => panic!("expected snapshot, got {other}"),
    }
}

#[tokio::test]
async fn test_mutations_fan_out_to_every_connection() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut first = server.connect_ws().await.unwrap();
    let mut second = server.connect_ws().await.unwrap();
    assert!(matches!(next_event(&mut first).await.unwrap(), PollEvent::Snapshot { .. }));
    assert!(matches!(next_event(&mut second).await.unwrap(), PollEvent::Snapshot { .. }));

    let poll = create_poll(&server).await;
    let expected = PollEvent::Created { poll: poll.clone() };
    assert_eq!(next_event(&mut first).await.unwrap(), expected);
    assert_eq!(next_event(&mut second).await.unwrap(), expected);

    // The closed connection must not break delivery to the other one
    first.close(None).await.unwrap();
    drop(first);

    let response = server
        .post(
            &format!("/polls/{}/vote", poll.id),
            &VoteRequest {
                option_id: poll.options[0].id.into_inner(),
            },
        )
        .await
        .unwrap();
    let voted: Poll = assert_json(response, StatusCode::OK).await.unwrap();

    match next_event(&mut second).await.unwrap() {
        PollEvent::Updated { poll } => {
            assert_eq!(poll, voted);
            assert_eq!(poll.options[0].votes, 1);
        }
        other => panic!("expected updated, got {other}"),
    }
}

#[tokio::test]
async fn test_failed_mutation_is_not_broadcast() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut ws = server.connect_ws().await.unwrap();
    next_event(&mut ws).await.unwrap();

    let response = server.post_empty("/polls/4242/like").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .post("/polls", &CreatePollRequest::with_options(&["lonely"]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_no_event(&mut ws, Duration::from_millis(300)).await.unwrap();
}

#[tokio::test]
async fn test_inbound_messages_are_ignored() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut ws = server.connect_ws().await.unwrap();
    next_event(&mut ws).await.unwrap();

    ws.send(Message::Text("hello".to_string())).await.unwrap();

    let poll = create_poll(&server).await;
    assert_eq!(
        next_event(&mut ws).await.unwrap(),
        PollEvent::Created { poll }
    );
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut ws = server.connect_ws().await.unwrap();
    next_event(&mut ws).await.unwrap();

    server.shutdown().await.unwrap();

    assert!(next_event(&mut ws).await.is_err());
}
